//! Event-details command implementation.

use crate::context::Context;
use crate::output;

pub fn run(ctx: &Context, event_id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.open_snapshot()?;
    let details = store.get_event_details(event_id);
    output::print_details(event_id, &details, ctx.json);
    Ok(())
}
