//! Cancel-event command implementation.

use crate::context::Context;
use crate::output;

pub fn run(ctx: &Context, event_id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    let store = ctx.open_store()?;

    let notification = store.cancel_event(&caller, event_id)?;
    output::print_notification(&notification, ctx.json);
    Ok(())
}
