//! Is-attending command implementation.

use crate::context::Context;
use crate::output;
use attendance_core::Identity;
use serde_json::json;

pub fn run(ctx: &Context, event_id: u64, attendee: String) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.open_snapshot()?;
    let attendee = Identity::from(attendee);
    let attending = store.is_attending(event_id, &attendee);

    if ctx.json {
        let value = json!({
            "event_id": event_id,
            "attendee": attendee,
            "attending": attending,
        });
        println!("{}", output::format_json(&value));
    } else {
        println!("{}", attending);
    }
    Ok(())
}
