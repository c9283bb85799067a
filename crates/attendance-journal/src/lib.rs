//! Append-only journal format for attendance registry records.
//!
//! This crate provides:
//! - A framed, append-only file layout (`.atj`) for JSON records
//! - A writer that never leaves a torn frame after a failed append
//! - A reader with strict and permissive handling of truncated tails
//!
//! Layout: a 16-byte header (`ATJ1`, version, flags, reserved) followed by
//! frames of `kind | reserved[3] | len u32 LE | payload`. Readers skip frame
//! kinds they do not know.
//!
//! The journal is agnostic to what the records mean; `attendance-store`
//! gives them their hash-chained structure.

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Header and frame layout.
pub mod frame;
/// Journal reader implementation.
pub mod reader;
/// Journal writer implementation.
pub mod writer;

pub use errors::JournalError;
pub use frame::{FrameHeader, FrameKind, JournalHeader, MAX_PAYLOAD_SIZE};
pub use reader::{JournalReader, ReadMode};
pub use writer::{JournalWriter, WriteOptions};
