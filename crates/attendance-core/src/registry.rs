//! The attendance state machine.

use crate::errors::{Operation, RegistryError, ReplayError};
use crate::event::{Event, EventDetails, EventId};
use crate::identity::Identity;
use crate::notification::Notification;

/// Attendance registry: organizer authority, event counter, and event records.
///
/// Mutating operations are split into a `plan_*` step that validates against
/// the current state and returns the notification that would be emitted, and
/// a commit that applies it. The public operations run both, so a failed
/// operation never touches state. Committed notifications are queued in an
/// outbox until [`Registry::drain_notifications`] is called.
///
/// # Example
///
/// ```rust
/// use attendance_core::{Identity, Registry};
///
/// let organizer = Identity::new("organizer");
/// let alice = Identity::new("alice");
/// let mut registry = Registry::new(organizer.clone())?;
///
/// let id = registry.create_event(&organizer, "Launch", 100, 200)?;
/// registry.check_in(&alice, id, 150)?;
/// assert!(registry.is_attending(id, &alice));
/// # Ok::<(), attendance_core::RegistryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    organizer: Identity,
    events: Vec<Event>,
    outbox: Vec<Notification>,
}

impl Registry {
    /// Creates an empty registry owned by `organizer`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidAddress`] if `organizer` is the zero identity.
    pub fn new(organizer: Identity) -> Result<Self, RegistryError> {
        if organizer.is_zero() {
            return Err(RegistryError::InvalidAddress);
        }
        Ok(Self {
            organizer,
            events: Vec::new(),
            outbox: Vec::new(),
        })
    }

    /// Current organizer.
    pub fn organizer(&self) -> &Identity {
        &self.organizer
    }

    /// Number of events ever created; also the next event id.
    pub fn event_count(&self) -> u64 {
        self.events.len() as u64
    }

    /// Stored record for `event_id`, if it was ever created.
    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        usize::try_from(event_id)
            .ok()
            .and_then(|index| self.events.get(index))
    }

    fn event_mut(&mut self, event_id: EventId) -> Option<&mut Event> {
        usize::try_from(event_id)
            .ok()
            .and_then(move |index| self.events.get_mut(index))
    }

    fn active_event(&self, operation: Operation, event_id: EventId) -> Result<&Event, RegistryError> {
        self.event(event_id)
            .filter(|event| event.exists())
            .ok_or(RegistryError::EventNotFound {
                operation,
                event_id,
            })
    }

    fn require_organizer(&self, operation: Operation, caller: &Identity) -> Result<(), RegistryError> {
        if *caller != self.organizer {
            return Err(RegistryError::Unauthorized {
                operation,
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Validates `create_event` without applying it.
    ///
    /// Returns the id the event will receive along with the notification.
    pub fn plan_create_event(
        &self,
        caller: &Identity,
        name: impl Into<String>,
        start_time: u64,
        end_time: u64,
    ) -> Result<(EventId, Notification), RegistryError> {
        self.require_organizer(Operation::CreateEvent, caller)?;
        if start_time >= end_time {
            return Err(RegistryError::InvalidTimeRange {
                start_time,
                end_time,
            });
        }
        let event_id = self.event_count();
        event_id
            .checked_add(1)
            .ok_or(RegistryError::CounterOverflow)?;
        Ok((
            event_id,
            Notification::EventCreated {
                event_id,
                name: name.into(),
                start_time,
                end_time,
            },
        ))
    }

    /// Validates `check_in` without applying it.
    ///
    /// Checks run in order: existence, window, then duplicate.
    pub fn plan_check_in(
        &self,
        caller: &Identity,
        event_id: EventId,
        now: u64,
    ) -> Result<Notification, RegistryError> {
        let event = self.active_event(Operation::CheckIn, event_id)?;
        if !event.window_contains(now) {
            return Err(RegistryError::OutsideCheckInWindow {
                event_id,
                now,
                start_time: event.start_time(),
                end_time: event.end_time(),
            });
        }
        if event.is_attending(caller) {
            return Err(RegistryError::AlreadyCheckedIn {
                event_id,
                attendee: caller.clone(),
            });
        }
        Ok(Notification::CheckedIn {
            event_id,
            attendee: caller.clone(),
        })
    }

    /// Validates `cancel_event` without applying it.
    pub fn plan_cancel_event(
        &self,
        caller: &Identity,
        event_id: EventId,
    ) -> Result<Notification, RegistryError> {
        self.require_organizer(Operation::CancelEvent, caller)?;
        self.active_event(Operation::CancelEvent, event_id)?;
        Ok(Notification::EventCancelled { event_id })
    }

    /// Validates `update_organizer` without applying it.
    pub fn plan_update_organizer(
        &self,
        caller: &Identity,
        new_organizer: Identity,
    ) -> Result<Notification, RegistryError> {
        self.require_organizer(Operation::UpdateOrganizer, caller)?;
        if new_organizer.is_zero() {
            return Err(RegistryError::InvalidAddress);
        }
        Ok(Notification::OrganizerUpdated { new_organizer })
    }

    /// Creates an event and returns its id. Organizer only.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] if `caller` is not the organizer
    /// - [`RegistryError::InvalidTimeRange`] unless `start_time < end_time`
    pub fn create_event(
        &mut self,
        caller: &Identity,
        name: impl Into<String>,
        start_time: u64,
        end_time: u64,
    ) -> Result<EventId, RegistryError> {
        let (event_id, notification) = self.plan_create_event(caller, name, start_time, end_time)?;
        self.commit(notification);
        Ok(event_id)
    }

    /// Records `caller` as attending `event_id` at time `now`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EventNotFound`] if the event was never created or is cancelled
    /// - [`RegistryError::OutsideCheckInWindow`] unless `start_time <= now <= end_time`
    /// - [`RegistryError::AlreadyCheckedIn`] on a repeated check-in
    pub fn check_in(
        &mut self,
        caller: &Identity,
        event_id: EventId,
        now: u64,
    ) -> Result<(), RegistryError> {
        let notification = self.plan_check_in(caller, event_id, now)?;
        self.commit(notification);
        Ok(())
    }

    /// Soft-deletes an event. Attendance records remain readable.
    pub fn cancel_event(&mut self, caller: &Identity, event_id: EventId) -> Result<(), RegistryError> {
        let notification = self.plan_cancel_event(caller, event_id)?;
        self.commit(notification);
        Ok(())
    }

    /// Transfers organizer authority, effective immediately.
    pub fn update_organizer(
        &mut self,
        caller: &Identity,
        new_organizer: Identity,
    ) -> Result<(), RegistryError> {
        let notification = self.plan_update_organizer(caller, new_organizer)?;
        self.commit(notification);
        Ok(())
    }

    /// Check-in flag for (`event_id`, `attendee`); `false` for anything never written.
    pub fn is_attending(&self, event_id: EventId, attendee: &Identity) -> bool {
        self.event(event_id)
            .map(|event| event.is_attending(attendee))
            .unwrap_or(false)
    }

    /// Event details; zero-valued for ids never created.
    pub fn get_event_details(&self, event_id: EventId) -> EventDetails {
        self.event(event_id)
            .map(Event::details)
            .unwrap_or_default()
    }

    /// Applies a notification produced by a `plan_*` call and queues it.
    ///
    /// Callers that split planning from committing (to persist the
    /// notification first) must not touch the registry between the two.
    pub fn commit_planned(&mut self, notification: Notification) -> Result<(), ReplayError> {
        self.validate(&notification)?;
        self.commit(notification);
        Ok(())
    }

    /// Applies and queues a notification that [`Registry::validate`] has
    /// already accepted against the current state.
    ///
    /// Skips the structural check `commit_planned` repeats. The registry must
    /// not have changed since the notification was validated.
    pub fn commit_validated(&mut self, notification: Notification) {
        self.commit(notification);
    }

    /// Replays a previously committed notification.
    ///
    /// Only structural consistency is checked; authorization and the
    /// check-in window were enforced when the notification was first
    /// committed. Replayed notifications are not queued in the outbox.
    pub fn apply(&mut self, notification: &Notification) -> Result<(), ReplayError> {
        self.validate(notification)?;
        self.mutate(notification.clone());
        Ok(())
    }

    /// Takes all notifications committed since the last drain.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    /// Checks that `notification` fits the current state, without applying it.
    ///
    /// This is the structural check [`Registry::apply`] runs: ids in order,
    /// events known and active, no duplicate check-in, non-zero organizer.
    pub fn validate(&self, notification: &Notification) -> Result<(), ReplayError> {
        match notification {
            Notification::RegistryInitialized { .. } => Err(ReplayError::Reinitialized),
            Notification::EventCreated {
                event_id,
                start_time,
                end_time,
                ..
            } => {
                let expected = self.event_count();
                if *event_id != expected {
                    return Err(ReplayError::OutOfOrder {
                        expected,
                        found: *event_id,
                    });
                }
                if start_time >= end_time {
                    return Err(ReplayError::InvalidWindow {
                        event_id: *event_id,
                        start_time: *start_time,
                        end_time: *end_time,
                    });
                }
                Ok(())
            }
            Notification::CheckedIn { event_id, attendee } => {
                let event = self
                    .event(*event_id)
                    .ok_or(ReplayError::UnknownEvent(*event_id))?;
                if !event.exists() {
                    return Err(ReplayError::InactiveEvent(*event_id));
                }
                if event.is_attending(attendee) {
                    return Err(ReplayError::DuplicateCheckIn {
                        event_id: *event_id,
                        attendee: attendee.clone(),
                    });
                }
                Ok(())
            }
            Notification::EventCancelled { event_id } => {
                let event = self
                    .event(*event_id)
                    .ok_or(ReplayError::UnknownEvent(*event_id))?;
                if !event.exists() {
                    return Err(ReplayError::InactiveEvent(*event_id));
                }
                Ok(())
            }
            Notification::OrganizerUpdated { new_organizer } => {
                if new_organizer.is_zero() {
                    return Err(ReplayError::ZeroOrganizer);
                }
                Ok(())
            }
        }
    }

    fn commit(&mut self, notification: Notification) {
        self.mutate(notification.clone());
        self.outbox.push(notification);
    }

    fn mutate(&mut self, notification: Notification) {
        match notification {
            Notification::RegistryInitialized { .. } => {}
            Notification::EventCreated {
                name,
                start_time,
                end_time,
                ..
            } => {
                self.events.push(Event::new(name, start_time, end_time));
            }
            Notification::CheckedIn { event_id, attendee } => {
                if let Some(event) = self.event_mut(event_id) {
                    event.mark_attending(attendee);
                }
            }
            Notification::EventCancelled { event_id } => {
                if let Some(event) = self.event_mut(event_id) {
                    event.cancel();
                }
            }
            Notification::OrganizerUpdated { new_organizer } => {
                self.organizer = new_organizer;
            }
        }
    }
}
