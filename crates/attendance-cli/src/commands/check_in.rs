//! Check-in command implementation.

use crate::context::{now_seconds, Context};
use crate::output;

pub fn run(ctx: &Context, event_id: u64, now: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    let now = match now {
        Some(t) => t,
        None => now_seconds()?,
    };
    let store = ctx.open_store()?;

    let notification = store.check_in(&caller, event_id, now)?;
    output::print_notification(&notification, ctx.json);
    Ok(())
}
