//! Cross-process locking of a journal.
//!
//! Writers hold an exclusive lock on a sidecar `<journal>.lock` file for as
//! long as their [`AttendanceStore`](crate::AttendanceStore) lives. Readers
//! take a shared lock only while replaying, so they never observe a frame a
//! writer is still appending. Locks are OS-level (`flock` on Unix,
//! `LockFileEx` on Windows) and are released even if the process dies.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Path of the lock file guarding `journal`.
pub fn lock_path(journal: &Path) -> PathBuf {
    let mut name = OsString::from(journal.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// A held lock on a journal; released on drop.
#[derive(Debug)]
pub struct JournalLock {
    file: File,
    path: PathBuf,
}

impl JournalLock {
    /// Takes the exclusive writer lock on `journal` without blocking.
    ///
    /// # Errors
    ///
    /// [`StoreError::Locked`] if another handle holds the journal.
    pub fn exclusive(journal: &Path) -> Result<Self, StoreError> {
        let path = lock_path(journal);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|e| contended(e, journal))?;
        debug!(path = %path.display(), "acquired exclusive journal lock");
        Ok(Self { file, path })
    }

    /// Takes a shared reader lock on `journal` without blocking.
    ///
    /// Returns `None` when no writer has ever locked the journal, so readers
    /// need no write access to its directory.
    ///
    /// # Errors
    ///
    /// [`StoreError::Locked`] while a writer holds the journal.
    pub fn shared(journal: &Path) -> Result<Option<Self>, StoreError> {
        let path = lock_path(journal);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        FileExt::try_lock_shared(&file).map_err(|e| contended(e, journal))?;
        debug!(path = %path.display(), "acquired shared journal lock");
        Ok(Some(Self { file, path }))
    }
}

fn contended(err: io::Error, journal: &Path) -> StoreError {
    let would_block = err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error();
    if would_block {
        StoreError::Locked(journal.to_path_buf())
    } else {
        StoreError::Io(err)
    }
}

impl Drop for JournalLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release journal lock");
        } else {
            debug!(path = %self.path.display(), "released journal lock");
        }
    }
}
