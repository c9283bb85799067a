//! Options shared by every command.

use attendance_core::Identity;
use attendance_store::{AttendanceStore, ReadMode, StoreOptions, StoreSnapshot};
use thiserror::Error;

/// Command-line usage errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("this command needs a caller identity; pass --as or set ATTENDANCE_IDENTITY")]
    MissingCaller,
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] attendance_core::ValidationError),
    #[error("system clock is before the Unix epoch")]
    ClockBeforeEpoch,
}

pub struct Context {
    pub journal: String,
    caller: Option<String>,
    sync: bool,
    permissive: bool,
    pub json: bool,
}

impl Context {
    pub fn new(journal: String, caller: Option<String>, sync: bool, permissive: bool, json: bool) -> Self {
        Self {
            journal,
            caller,
            sync,
            permissive,
            json,
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            sync: self.sync,
            read_mode: self.read_mode(),
        }
    }

    pub fn read_mode(&self) -> ReadMode {
        if self.permissive {
            ReadMode::Permissive
        } else {
            ReadMode::Strict
        }
    }

    /// Parsed `--as` identity.
    pub fn caller(&self) -> Result<Identity, CliError> {
        let raw = self.caller.as_deref().ok_or(CliError::MissingCaller)?;
        Ok(Identity::parse(raw)?)
    }

    pub fn open_store(&self) -> Result<AttendanceStore, Box<dyn std::error::Error>> {
        AttendanceStore::open(&self.journal, self.store_options())
            .map_err(|e| format!("Failed to open journal {}: {}", self.journal, e).into())
    }

    /// Replays the journal for queries without opening it for writing.
    pub fn open_snapshot(&self) -> Result<StoreSnapshot, Box<dyn std::error::Error>> {
        AttendanceStore::open_read_only(&self.journal, self.read_mode())
            .map_err(|e| format!("Failed to open journal {}: {}", self.journal, e).into())
    }
}

/// Current wall-clock time in whole seconds.
pub fn now_seconds() -> Result<u64, CliError> {
    u64::try_from(chrono::Utc::now().timestamp()).map_err(|_| CliError::ClockBeforeEpoch)
}
