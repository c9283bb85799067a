//! Create-event command implementation.

use crate::context::Context;
use serde_json::json;

pub fn run(ctx: &Context, name: String, start: u64, end: u64) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    let store = ctx.open_store()?;

    let event_id = store.create_event(&caller, name.clone(), start, end)?;

    if ctx.json {
        let value = json!({
            "kind": "event_created",
            "event_id": event_id,
            "name": name,
            "start_time": start,
            "end_time": end,
        });
        println!("{}", crate::output::format_json(&value));
    } else {
        println!("{}", event_id);
    }
    Ok(())
}
