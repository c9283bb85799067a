//! Journal-backed attendance registry.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use attendance_core::{
    EventDetails, EventId, Identity, Notification, Registry, RegistryError,
};
use attendance_journal::{JournalError, JournalReader, JournalWriter, ReadMode, WriteOptions};
use tracing::{debug, info, warn};

use crate::chain::{ChainTip, Digest, LedgerRecord};
use crate::error::StoreError;
use crate::lock::JournalLock;

/// Options for opening or creating a store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Fsync the journal after every record (default: false).
    pub sync: bool,
    /// How a torn trailing frame is handled on open (default: strict).
    ///
    /// In permissive mode the torn frame is cut off before new records are
    /// appended.
    pub read_mode: ReadMode,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sync: false,
            read_mode: ReadMode::Strict,
        }
    }
}

/// Result of replaying or verifying a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of records, genesis included.
    pub records: u64,
    /// Digest of the last record.
    pub tip: Option<Digest>,
    /// Byte length of the verified prefix.
    pub valid_len: u64,
    /// True if a torn trailing frame was ignored.
    pub truncated: bool,
}

struct Replayed {
    registry: Registry,
    tip: ChainTip,
    report: ChainReport,
}

/// Rebuilds a registry from the journal at `path`, verifying the hash chain.
fn replay(path: &Path, mode: ReadMode) -> Result<Replayed, StoreError> {
    let mut reader = JournalReader::open(path, mode)?;
    let mut tip = ChainTip::default();

    let genesis: LedgerRecord = reader.read_record()?.ok_or(StoreError::MissingGenesis)?;
    let Notification::RegistryInitialized { organizer } = &genesis.notification else {
        return Err(StoreError::MissingGenesis);
    };
    tip.accept(&genesis)?;
    let mut registry = Registry::new(organizer.clone()).map_err(|_| StoreError::Replay {
        seq: genesis.seq,
        source: attendance_core::ReplayError::ZeroOrganizer,
    })?;

    while let Some(record) = reader.read_record::<LedgerRecord>()? {
        tip.accept(&record)?;
        registry
            .apply(&record.notification)
            .map_err(|source| StoreError::Replay {
                seq: record.seq,
                source,
            })?;
        debug!(seq = record.seq, kind = record.notification.kind(), "replayed record");
    }

    let report = ChainReport {
        records: tip.next_seq,
        tip: tip.digest.clone(),
        valid_len: reader.valid_len(),
        truncated: reader.hit_truncation(),
    };
    Ok(Replayed {
        registry,
        tip,
        report,
    })
}

/// Replays under a shared lock, so no writer appends meanwhile.
fn replay_shared(path: &Path, mode: ReadMode) -> Result<Replayed, StoreError> {
    let _lock = JournalLock::shared(path)?;
    replay(path, mode)
}

/// Verifies a journal without opening it for writing.
///
/// Checks the header, every frame, the hash chain, and that every record
/// replays cleanly onto the state built from the ones before it. The file is
/// never modified, even in permissive mode.
///
/// # Errors
///
/// [`StoreError::Locked`] while a writer holds the journal, otherwise the
/// first integrity failure.
pub fn verify_journal<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<ChainReport, StoreError> {
    Ok(replay_shared(path.as_ref(), mode)?.report)
}

/// Read-only view of a journal, replayed once.
///
/// Holds no lock and never writes: a torn tail accepted in permissive mode
/// stays on disk.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    registry: Registry,
    report: ChainReport,
}

impl StoreSnapshot {
    /// Check-in flag; `false` for anything never written.
    pub fn is_attending(&self, event_id: EventId, attendee: &Identity) -> bool {
        self.registry.is_attending(event_id, attendee)
    }

    /// Event details; zero-valued for ids never created.
    pub fn get_event_details(&self, event_id: EventId) -> EventDetails {
        self.registry.get_event_details(event_id)
    }

    /// Organizer at the time of the snapshot.
    pub fn organizer(&self) -> &Identity {
        self.registry.organizer()
    }

    /// Number of events ever created.
    pub fn event_count(&self) -> u64 {
        self.registry.event_count()
    }

    /// Chain summary of the replayed journal.
    pub fn report(&self) -> &ChainReport {
        &self.report
    }
}

struct Inner {
    registry: Registry,
    writer: JournalWriter,
    tip: ChainTip,
}

/// Durable attendance registry.
///
/// All state sits behind a single mutex. Each mutating operation holds it
/// across plan, journal append, and commit, so operations are serialized
/// and a failed one leaves both memory and journal untouched. The store is
/// `Send + Sync`; share it with `Arc` to serve callers from many threads.
///
/// A store also holds an exclusive [`JournalLock`] for its whole life, so a
/// second store on the same path, in this process or another, is refused
/// with [`StoreError::Locked`] until the first is dropped.
///
/// # Example
///
/// ```rust
/// use attendance_core::Identity;
/// use attendance_store::{AttendanceStore, StoreOptions};
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("registry.atj");
/// let organizer = Identity::new("organizer");
///
/// let store = AttendanceStore::create(&path, organizer.clone(), StoreOptions::default())?;
/// let id = store.create_event(&organizer, "Launch", 100, 200)?;
/// store.check_in(&Identity::new("alice"), id, 150)?;
/// drop(store);
///
/// let reopened = AttendanceStore::open(&path, StoreOptions::default())?;
/// assert!(reopened.is_attending(id, &Identity::new("alice")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AttendanceStore {
    path: PathBuf,
    inner: Mutex<Inner>,
    // Declared after `inner` so the writer closes before the lock is released.
    _lock: JournalLock,
}

impl AttendanceStore {
    /// Creates a new journal at `path` owned by `organizer`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyInitialized`] if the file exists and is not empty
    /// - [`StoreError::Registry`] with `InvalidAddress` for the zero identity
    /// - [`StoreError::Locked`] if another store holds the path
    pub fn create<P: AsRef<Path>>(
        path: P,
        organizer: Identity,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let registry = Registry::new(organizer.clone())?;

        let lock = JournalLock::exclusive(&path)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => return Err(StoreError::AlreadyInitialized(path)),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut writer = JournalWriter::open(
            &path,
            WriteOptions {
                sync: options.sync,
                create: true,
                truncate_at: None,
            },
        )?;
        let mut tip = ChainTip::default();
        let genesis = tip.next_record(Notification::RegistryInitialized { organizer })?;
        writer.append_record(&genesis)?;
        tip.advance(&genesis);

        info!(path = %path.display(), organizer = %registry.organizer(), "created attendance journal");
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                registry,
                writer,
                tip,
            }),
            _lock: lock,
        })
    }

    /// Opens an existing journal and replays it.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Journal`] for unreadable files or, in strict mode, a torn tail
    /// - [`StoreError::MissingGenesis`], [`StoreError::ChainBroken`], or
    ///   [`StoreError::Replay`] if the records are not a valid history
    /// - [`StoreError::Locked`] if another store holds the path
    pub fn open<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(JournalError::from)?;

        let lock = JournalLock::exclusive(&path)?;
        let Replayed {
            registry,
            tip,
            report,
        } = replay(&path, options.read_mode)?;

        if report.truncated {
            warn!(
                path = %path.display(),
                valid_len = report.valid_len,
                "discarding torn trailing frame"
            );
        }
        let writer = JournalWriter::open(
            &path,
            WriteOptions {
                sync: options.sync,
                create: false,
                truncate_at: Some(report.valid_len),
            },
        )?;

        info!(
            path = %path.display(),
            records = report.records,
            events = registry.event_count(),
            "opened attendance journal"
        );
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                registry,
                writer,
                tip,
            }),
            _lock: lock,
        })
    }

    /// Replays the journal at `path` without opening it for writing.
    ///
    /// Needs only read access to the journal. In permissive mode a torn tail
    /// is ignored in the snapshot but left on disk.
    ///
    /// # Errors
    ///
    /// As [`verify_journal`].
    pub fn open_read_only<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<StoreSnapshot, StoreError> {
        let Replayed {
            registry, report, ..
        } = replay_shared(path.as_ref(), mode)?;
        debug!(
            records = report.records,
            events = registry.event_count(),
            "replayed read-only snapshot"
        );
        Ok(StoreSnapshot { registry, report })
    }

    /// Journal location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Every operation validates and commits under the lock, and the commit
    // cannot panic, so a poisoned guard still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transact<F>(&self, plan: F) -> Result<Notification, StoreError>
    where
        F: FnOnce(&Registry) -> Result<Notification, RegistryError>,
    {
        let mut inner = self.lock();
        let notification = match plan(&inner.registry) {
            Ok(notification) => notification,
            Err(err) => {
                debug!(error = %err, "operation rejected");
                return Err(err.into());
            }
        };
        let seq = inner.tip.next_seq;
        inner
            .registry
            .validate(&notification)
            .map_err(|source| StoreError::Replay { seq, source })?;

        let record = inner.tip.next_record(notification)?;
        inner.writer.append_record(&record)?;
        inner.tip.advance(&record);

        inner.registry.commit_validated(record.notification.clone());
        inner.registry.drain_notifications();

        info!(
            seq,
            kind = record.notification.kind(),
            event_id = ?record.notification.event_id(),
            "committed"
        );
        Ok(record.notification)
    }

    /// Creates an event and returns its id. Organizer only.
    pub fn create_event(
        &self,
        caller: &Identity,
        name: impl Into<String>,
        start_time: u64,
        end_time: u64,
    ) -> Result<EventId, StoreError> {
        let mut event_id = 0;
        self.transact(|r| {
            let (id, notification) = r.plan_create_event(caller, name, start_time, end_time)?;
            event_id = id;
            Ok(notification)
        })?;
        Ok(event_id)
    }

    /// Records `caller` as attending `event_id` at time `now`.
    pub fn check_in(&self, caller: &Identity, event_id: EventId, now: u64) -> Result<Notification, StoreError> {
        self.transact(|r| r.plan_check_in(caller, event_id, now))
    }

    /// Soft-deletes an event. Organizer only.
    pub fn cancel_event(&self, caller: &Identity, event_id: EventId) -> Result<Notification, StoreError> {
        self.transact(|r| r.plan_cancel_event(caller, event_id))
    }

    /// Transfers organizer authority. Organizer only.
    pub fn update_organizer(
        &self,
        caller: &Identity,
        new_organizer: Identity,
    ) -> Result<Notification, StoreError> {
        self.transact(|r| r.plan_update_organizer(caller, new_organizer))
    }

    /// Check-in flag; `false` for anything never written.
    pub fn is_attending(&self, event_id: EventId, attendee: &Identity) -> bool {
        self.lock().registry.is_attending(event_id, attendee)
    }

    /// Event details; zero-valued for ids never created.
    pub fn get_event_details(&self, event_id: EventId) -> EventDetails {
        self.lock().registry.get_event_details(event_id)
    }

    /// Current organizer.
    pub fn organizer(&self) -> Identity {
        self.lock().registry.organizer().clone()
    }

    /// Number of events ever created.
    pub fn event_count(&self) -> u64 {
        self.lock().registry.event_count()
    }

    /// Number of records in the journal and the digest of the last one.
    pub fn chain_tip(&self) -> (u64, Option<Digest>) {
        let inner = self.lock();
        (inner.tip.next_seq, inner.tip.digest.clone())
    }
}
