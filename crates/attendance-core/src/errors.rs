use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventId;
use crate::identity::Identity;

/// Registry operation, used to give failures their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `create_event`.
    CreateEvent,
    /// `check_in`.
    CheckIn,
    /// `cancel_event`.
    CancelEvent,
    /// `update_organizer`.
    UpdateOrganizer,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::CreateEvent => "create_event",
            Operation::CheckIn => "check_in",
            Operation::CancelEvent => "cancel_event",
            Operation::UpdateOrganizer => "update_organizer",
        })
    }
}

/// Precondition failures of registry operations.
///
/// Every variant aborts the operation before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller is not the organizer.
    #[error("{operation}: caller {caller} is not the organizer")]
    Unauthorized {
        /// Rejected operation.
        operation: Operation,
        /// Identity that attempted it.
        caller: Identity,
    },
    /// Start time is not strictly before end time.
    #[error("create_event: start time {start_time} must be before end time {end_time}")]
    InvalidTimeRange {
        /// Requested start.
        start_time: u64,
        /// Requested end.
        end_time: u64,
    },
    /// Event was never created or has been cancelled.
    #[error("{operation}: event {event_id} does not exist")]
    EventNotFound {
        /// Rejected operation.
        operation: Operation,
        /// Requested event.
        event_id: EventId,
    },
    /// Check-in attempted outside `[start_time, end_time]`.
    #[error("check_in: time {now} is outside the window [{start_time}, {end_time}] of event {event_id}")]
    OutsideCheckInWindow {
        /// Requested event.
        event_id: EventId,
        /// Time of the attempt.
        now: u64,
        /// Window start (inclusive).
        start_time: u64,
        /// Window end (inclusive).
        end_time: u64,
    },
    /// Caller already checked in to this event.
    #[error("check_in: {attendee} already checked in to event {event_id}")]
    AlreadyCheckedIn {
        /// Requested event.
        event_id: EventId,
        /// Identity that is already recorded.
        attendee: Identity,
    },
    /// New organizer is the zero identity.
    #[error("update_organizer: new organizer must not be the zero identity")]
    InvalidAddress,
    /// Event counter cannot be incremented.
    #[error("create_event: event counter overflow")]
    CounterOverflow,
}

/// Structural inconsistencies found while replaying committed notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// Created event id does not match the current counter.
    #[error("event created out of order: expected id {expected}, found {found}")]
    OutOfOrder {
        /// Id the counter would assign.
        expected: EventId,
        /// Id carried by the notification.
        found: EventId,
    },
    /// Notification refers to an event that was never created.
    #[error("notification refers to unknown event {0}")]
    UnknownEvent(EventId),
    /// Event was already cancelled, or check-in targets a cancelled event.
    #[error("event {0} is not active")]
    InactiveEvent(EventId),
    /// Check-in recorded twice for the same identity.
    #[error("duplicate check-in of {attendee} to event {event_id}")]
    DuplicateCheckIn {
        /// Event id.
        event_id: EventId,
        /// Duplicated identity.
        attendee: Identity,
    },
    /// Created event carries an empty or inverted window.
    #[error("event {event_id} has invalid window [{start_time}, {end_time}]")]
    InvalidWindow {
        /// Event id.
        event_id: EventId,
        /// Start time.
        start_time: u64,
        /// End time.
        end_time: u64,
    },
    /// Organizer set to the zero identity.
    #[error("organizer cannot be the zero identity")]
    ZeroOrganizer,
    /// Genesis notification applied to an already-initialized registry.
    #[error("registry initialized twice")]
    Reinitialized,
}
