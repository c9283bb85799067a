//! Durable attendance registry backed by an append-only journal.
//!
//! This crate provides:
//! - [`AttendanceStore`]: the registry behind a single mutex, with every
//!   committed notification appended to a journal before it takes effect
//! - Replay on open, so state survives restarts
//! - A SHA-256 hash chain over journal records, checked on every open and by
//!   [`verify_journal`]
//! - An OS-level lock per journal, so only one writer exists across processes
//!
//! Journal records are [`LedgerRecord`]s: the notification plus its sequence
//! number, a back-link to the previous record's digest, and its own digest.

#![deny(missing_docs)]

/// Hash-chained ledger records.
pub mod chain;
/// Error types for store operations.
pub mod error;
/// Cross-process journal locks.
pub mod lock;
/// The journal-backed registry.
pub mod store;

pub use attendance_journal::ReadMode;
pub use chain::{ChainTip, Digest, DigestAlg, LedgerRecord};
pub use error::StoreError;
pub use lock::JournalLock;
pub use store::{verify_journal, AttendanceStore, ChainReport, StoreOptions, StoreSnapshot};
