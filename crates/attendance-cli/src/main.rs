//! Attendance CLI - command-line interface for the journal-backed attendance registry.

use clap::{Parser, Subcommand};

mod commands;
mod context;
mod output;
mod telemetry;

use commands::{cancel, check_in, create, details, init, organizer, query, verify};
use context::Context;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Event attendance registry: create events, check in, and query attendance")]
struct Cli {
    /// Path to the registry journal
    #[arg(long, global = true, env = "ATTENDANCE_JOURNAL", default_value = "attendance.atj")]
    journal: String,
    /// Identity issuing the command
    #[arg(long = "as", global = true, env = "ATTENDANCE_IDENTITY")]
    caller: Option<String>,
    /// Fsync the journal after every write
    #[arg(long, global = true)]
    sync: bool,
    /// Cut off a torn trailing record instead of failing
    #[arg(long, global = true)]
    permissive: bool,
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new registry journal
    Init {
        /// Initial organizer identity
        #[arg(long)]
        organizer: String,
    },
    /// Create an event (organizer only)
    CreateEvent {
        /// Event name
        name: String,
        /// Window start, seconds
        #[arg(long)]
        start: u64,
        /// Window end, seconds
        #[arg(long)]
        end: u64,
    },
    /// Check in to an event as the calling identity
    CheckIn {
        /// Event id
        event_id: u64,
        /// Time of the check-in in seconds (default: now)
        #[arg(long)]
        now: Option<u64>,
    },
    /// Show whether an identity checked in to an event
    IsAttending {
        /// Event id
        event_id: u64,
        /// Identity to look up
        attendee: String,
    },
    /// Cancel an event (organizer only)
    CancelEvent {
        /// Event id
        event_id: u64,
    },
    /// Transfer organizer authority (organizer only)
    UpdateOrganizer {
        /// New organizer identity
        new_organizer: String,
    },
    /// Show an event's name, window, and status
    EventDetails {
        /// Event id
        event_id: u64,
    },
    /// Verify the journal's hash chain and replay it
    Verify,
}

fn main() {
    telemetry::init_logging();
    let cli = Cli::parse();
    let ctx = Context::new(cli.journal, cli.caller, cli.sync, cli.permissive, cli.json);

    let result = match cli.command {
        Commands::Init { organizer } => init::run(&ctx, organizer),
        Commands::CreateEvent { name, start, end } => create::run(&ctx, name, start, end),
        Commands::CheckIn { event_id, now } => check_in::run(&ctx, event_id, now),
        Commands::IsAttending { event_id, attendee } => query::run(&ctx, event_id, attendee),
        Commands::CancelEvent { event_id } => cancel::run(&ctx, event_id),
        Commands::UpdateOrganizer { new_organizer } => organizer::run(&ctx, new_organizer),
        Commands::EventDetails { event_id } => details::run(&ctx, event_id),
        Commands::Verify => verify::run(&ctx),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
