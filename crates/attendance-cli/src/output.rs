//! Output formatting utilities.

use attendance_core::{EventDetails, EventId, Notification};
use serde_json::{json, Value};

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// One-line human summary of a committed notification.
pub fn describe_notification(notification: &Notification) -> String {
    match notification {
        Notification::RegistryInitialized { organizer } => {
            format!("Registry initialized; organizer is {organizer}")
        }
        Notification::EventCreated {
            event_id,
            name,
            start_time,
            end_time,
        } => format!("Created event {event_id} \"{name}\" [{start_time}, {end_time}]"),
        Notification::CheckedIn { event_id, attendee } => {
            format!("{attendee} checked in to event {event_id}")
        }
        Notification::EventCancelled { event_id } => format!("Cancelled event {event_id}"),
        Notification::OrganizerUpdated { new_organizer } => {
            format!("Organizer is now {new_organizer}")
        }
    }
}

/// Prints a notification as JSON or as its summary line.
pub fn print_notification(notification: &Notification, json_output: bool) {
    if json_output {
        let value = serde_json::to_value(notification).unwrap_or(Value::Null);
        println!("{}", format_json(&value));
    } else {
        println!("{}", describe_notification(notification));
    }
}

/// Prints event details as JSON or a small table.
pub fn print_details(event_id: EventId, details: &EventDetails, json_output: bool) {
    if json_output {
        let value = json!({
            "event_id": event_id,
            "name": details.name,
            "start_time": details.start_time,
            "end_time": details.end_time,
            "exists": details.exists,
        });
        println!("{}", format_json(&value));
        return;
    }

    println!("{:<8} {}", "EVENT", event_id);
    println!("{:<8} {}", "NAME", details.name);
    println!("{:<8} [{}, {}]", "WINDOW", details.start_time, details.end_time);
    println!(
        "{:<8} {}",
        "STATUS",
        if details.exists { "active" } else { "inactive" }
    );
}
