use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::identity::Identity;

/// Record of a committed state transition.
///
/// Every successful mutating operation emits exactly one notification, and
/// replaying the notifications in order rebuilds the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Genesis notice: the registry was created with this organizer.
    RegistryInitialized {
        /// Initial organizer.
        organizer: Identity,
    },
    /// `create_event` succeeded.
    EventCreated {
        /// Assigned id.
        event_id: EventId,
        /// Event name.
        name: String,
        /// Window start (inclusive).
        start_time: u64,
        /// Window end (inclusive).
        end_time: u64,
    },
    /// `check_in` succeeded.
    CheckedIn {
        /// Event id.
        event_id: EventId,
        /// Identity that checked in.
        attendee: Identity,
    },
    /// `cancel_event` succeeded.
    EventCancelled {
        /// Event id.
        event_id: EventId,
    },
    /// `update_organizer` succeeded.
    OrganizerUpdated {
        /// Organizer from now on.
        new_organizer: Identity,
    },
}

impl Notification {
    /// Event this notification concerns, if any.
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Notification::EventCreated { event_id, .. }
            | Notification::CheckedIn { event_id, .. }
            | Notification::EventCancelled { event_id } => Some(*event_id),
            Notification::RegistryInitialized { .. } | Notification::OrganizerUpdated { .. } => {
                None
            }
        }
    }

    /// Stable name matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::RegistryInitialized { .. } => "registry_initialized",
            Notification::EventCreated { .. } => "event_created",
            Notification::CheckedIn { .. } => "checked_in",
            Notification::EventCancelled { .. } => "event_cancelled",
            Notification::OrganizerUpdated { .. } => "organizer_updated",
        }
    }
}
