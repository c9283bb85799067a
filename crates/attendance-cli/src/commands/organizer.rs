//! Update-organizer command implementation.

use crate::context::{CliError, Context};
use crate::output;
use attendance_core::Identity;

pub fn run(ctx: &Context, new_organizer: String) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    // Empty stays the zero identity so the registry reports InvalidAddress.
    let new_organizer = if new_organizer.is_empty() {
        Identity::zero()
    } else {
        Identity::parse(new_organizer).map_err(CliError::from)?
    };

    let store = ctx.open_store()?;
    let notification = store.update_organizer(&caller, new_organizer)?;
    output::print_notification(&notification, ctx.json);
    Ok(())
}
