//! Event attendance state machine.
//!
//! This crate provides:
//! - The [`Registry`]: organizer authority, a dense event counter, and event records
//! - The six registry operations (create, check in, query attendance, cancel,
//!   transfer authority, query details)
//! - [`Notification`] values describing every committed transition
//! - The error taxonomy for rejected operations
//!
//! Core invariants:
//! - Event ids are dense from 0 and never reused
//! - `start_time < end_time` holds for every created event
//! - Cancellation is terminal and keeps attendance records readable
//! - A check-in flag, once set, is never cleared
//! - A rejected operation changes nothing and emits nothing
//!
#![deny(missing_docs)]

/// Error types for registry operations and replay.
pub mod errors;
/// Event records and the details view.
pub mod event;
/// Caller identities.
pub mod identity;
/// Notifications emitted by committed operations.
pub mod notification;
/// The registry state machine.
pub mod registry;

pub use errors::{Operation, RegistryError, ReplayError};
pub use event::{Event, EventDetails, EventId};
pub use identity::{Identity, ValidationError};
pub use notification::Notification;
pub use registry::Registry;
