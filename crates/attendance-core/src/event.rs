use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Event identifier, dense from 0.
pub type EventId = u64;

/// Stored event record.
///
/// Records are never removed; cancellation only clears `exists`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    name: String,
    start_time: u64,
    end_time: u64,
    exists: bool,
    attendees: HashMap<Identity, bool>,
}

impl Event {
    pub(crate) fn new(name: String, start_time: u64, end_time: u64) -> Self {
        Self {
            name,
            start_time,
            end_time,
            exists: true,
            attendees: HashMap::new(),
        }
    }

    /// Event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Window start (inclusive).
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Window end (inclusive).
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    /// False once cancelled.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// True if `now` lies in `[start_time, end_time]`.
    pub fn window_contains(&self, now: u64) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    /// Check-in flag for `attendee`, `false` when never written.
    pub fn is_attending(&self, attendee: &Identity) -> bool {
        self.attendees.get(attendee).copied().unwrap_or(false)
    }

    /// Number of identities checked in.
    pub fn attendee_count(&self) -> usize {
        self.attendees.values().filter(|checked| **checked).count()
    }

    pub(crate) fn mark_attending(&mut self, attendee: Identity) {
        self.attendees.insert(attendee, true);
    }

    pub(crate) fn cancel(&mut self) {
        self.exists = false;
    }

    /// Public view of this record.
    pub fn details(&self) -> EventDetails {
        EventDetails {
            name: self.name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            exists: self.exists,
        }
    }
}

/// Result of `get_event_details`.
///
/// Unknown ids produce [`EventDetails::default`]: empty name, zero window,
/// `exists = false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event name.
    pub name: String,
    /// Window start (inclusive).
    pub start_time: u64,
    /// Window end (inclusive).
    pub end_time: u64,
    /// False if never created or cancelled.
    pub exists: bool,
}
