//! Verify command implementation.

use crate::context::Context;
use crate::output;
use attendance_store::verify_journal;
use serde_json::json;

pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let report = verify_journal(&ctx.journal, ctx.read_mode())
        .map_err(|e| format!("Verification failed for {}: {}", ctx.journal, e))?;

    let tip = report.tip.as_ref().map(|d| d.b64.as_str()).unwrap_or("-");
    if ctx.json {
        let value = json!({
            "ok": true,
            "records": report.records,
            "tip": tip,
            "valid_len": report.valid_len,
            "truncated": report.truncated,
        });
        println!("{}", output::format_json(&value));
    } else {
        println!("OK: {} records, tip {}", report.records, tip);
        if report.truncated {
            println!("warning: torn trailing record after byte {}", report.valid_len);
        }
    }
    Ok(())
}
