//! Init command implementation.

use crate::context::Context;
use crate::output;
use attendance_core::{Identity, Notification};
use attendance_store::AttendanceStore;

pub fn run(ctx: &Context, organizer: String) -> Result<(), Box<dyn std::error::Error>> {
    let organizer = Identity::parse(organizer).map_err(|e| format!("Invalid organizer: {}", e))?;

    let store = AttendanceStore::create(&ctx.journal, organizer.clone(), ctx.store_options())
        .map_err(|e| format!("Failed to create journal {}: {}", ctx.journal, e))?;
    tracing::info!(journal = %store.path().display(), "registry initialized");

    output::print_notification(&Notification::RegistryInitialized { organizer }, ctx.json);
    Ok(())
}
