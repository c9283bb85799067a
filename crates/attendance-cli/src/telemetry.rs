use tracing_subscriber::EnvFilter;

/// Installs a stderr log subscriber filtered by `RUST_LOG` (default: `warn`).
///
/// Logs go to stderr so that command output on stdout stays parseable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
