//! Error types for store operations.

use std::path::PathBuf;

use attendance_core::{RegistryError, ReplayError};
use attendance_journal::JournalError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The registry rejected the operation; nothing was written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Journal backend error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    /// I/O error outside the journal itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A journaled notification does not fit the state rebuilt so far.
    #[error("record {seq} cannot be replayed: {source}")]
    Replay {
        /// Sequence number of the offending record.
        seq: u64,
        /// Underlying inconsistency.
        #[source]
        source: ReplayError,
    },
    /// Sequence numbers, back-links, or digests do not line up.
    #[error("hash chain broken at record {seq}: {reason}")]
    ChainBroken {
        /// Sequence number of the offending record.
        seq: u64,
        /// What did not match.
        reason: String,
    },
    /// Journal has no records, or its first record is not the genesis notice.
    #[error("journal does not start with a registry_initialized record")]
    MissingGenesis,
    /// `create` was pointed at a file that already holds data.
    #[error("journal already exists: {0}")]
    AlreadyInitialized(PathBuf),
    /// Another handle, possibly in another process, holds the journal.
    #[error("journal is locked by another process: {0}")]
    Locked(PathBuf),
}
