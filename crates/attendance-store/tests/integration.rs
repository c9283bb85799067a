use attendance_core::{EventDetails, Identity, Notification, RegistryError};
use attendance_journal::{JournalReader, JournalWriter, WriteOptions};
use attendance_store::{
    verify_journal, AttendanceStore, LedgerRecord, ReadMode, StoreError, StoreOptions,
};
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn organizer() -> Identity {
    Identity::new("organizer")
}

fn journal_path(dir: &TempDir) -> PathBuf {
    dir.path().join("registry.atj")
}

fn create_store(path: &Path) -> AttendanceStore {
    AttendanceStore::create(path, organizer(), StoreOptions::default()).unwrap()
}

fn read_records(path: &Path) -> Vec<LedgerRecord> {
    let mut reader = JournalReader::open(path, ReadMode::Strict).unwrap();
    let mut records = Vec::new();
    while let Some(record) = reader.read_record::<LedgerRecord>().unwrap() {
        records.push(record);
    }
    records
}

fn rewrite(path: &Path, records: &[serde_json::Value]) {
    fs::remove_file(path).unwrap();
    let mut writer = JournalWriter::open(path, WriteOptions::default()).unwrap();
    for record in records {
        writer.append_record(record).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    let alice = Identity::new("alice");
    let successor = Identity::new("successor");

    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Launch", 100, 200).unwrap();
        store.create_event(&organizer(), "Afterparty", 200, 300).unwrap();
        store.check_in(&alice, 0, 150).unwrap();
        store.cancel_event(&organizer(), 1).unwrap();
        store
            .update_organizer(&organizer(), successor.clone())
            .unwrap();
    }

    let store = AttendanceStore::open(&path, StoreOptions::default()).unwrap();
    assert_eq!(store.organizer(), successor);
    assert_eq!(store.event_count(), 2);
    assert!(store.is_attending(0, &alice));
    assert_eq!(
        store.get_event_details(0),
        EventDetails {
            name: "Launch".to_string(),
            start_time: 100,
            end_time: 200,
            exists: true,
        }
    );
    assert!(!store.get_event_details(1).exists);
    assert_eq!(store.chain_tip().0, 6);

    // Authority moved, also after restart.
    assert!(matches!(
        store.create_event(&organizer(), "stale", 1, 2),
        Err(StoreError::Registry(RegistryError::Unauthorized { .. }))
    ));
    assert_eq!(store.create_event(&successor, "fresh", 1, 2).unwrap(), 2);
}

#[test]
fn test_scenario_through_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&journal_path(&temp_dir));
    let a = Identity::new("a");
    let b = Identity::new("b");

    assert_eq!(store.create_event(&organizer(), "Event", 100, 200).unwrap(), 0);
    assert_eq!(
        store.check_in(&a, 0, 150).unwrap(),
        Notification::CheckedIn {
            event_id: 0,
            attendee: a.clone(),
        }
    );
    assert!(matches!(
        store.check_in(&a, 0, 150),
        Err(StoreError::Registry(RegistryError::AlreadyCheckedIn { .. }))
    ));
    assert!(matches!(
        store.check_in(&b, 0, 250),
        Err(StoreError::Registry(RegistryError::OutsideCheckInWindow { .. }))
    ));
    assert!(store.is_attending(0, &a));
    assert!(!store.is_attending(0, &b));
}

#[test]
fn test_rejected_operations_write_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    let store = create_store(&path);
    store.create_event(&organizer(), "Launch", 100, 200).unwrap();
    let len_before = fs::metadata(&path).unwrap().len();
    let tip_before = store.chain_tip();

    let mallory = Identity::new("mallory");
    assert!(store.create_event(&mallory, "x", 1, 2).is_err());
    assert!(store.create_event(&organizer(), "x", 2, 1).is_err());
    assert!(store.check_in(&mallory, 9, 150).is_err());
    assert!(store.check_in(&mallory, 0, 99).is_err());
    assert!(store.cancel_event(&mallory, 0).is_err());
    assert!(store.cancel_event(&organizer(), 5).is_err());
    assert!(store.update_organizer(&organizer(), Identity::zero()).is_err());

    assert_eq!(fs::metadata(&path).unwrap().len(), len_before);
    assert_eq!(store.chain_tip(), tip_before);
    assert_eq!(store.event_count(), 1);
}

#[test]
fn test_journal_records_are_chained() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Launch", 100, 200).unwrap();
        store.check_in(&Identity::new("alice"), 0, 100).unwrap();
    }

    let records = read_records(&path);
    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0].notification,
        Notification::RegistryInitialized {
            organizer: organizer()
        }
    );
    assert!(records[0].prev.is_none());
    for pair in records.windows(2) {
        assert_eq!(pair[1].seq, pair[0].seq + 1);
        assert_eq!(pair[1].prev.as_ref(), Some(&pair[0].digest));
    }

    let report = verify_journal(&path, ReadMode::Strict).unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.tip, Some(records[2].digest.clone()));
    assert!(!report.truncated);
}

#[test]
fn test_tampered_record_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Launch", 100, 200).unwrap();
        store.check_in(&Identity::new("alice"), 0, 150).unwrap();
    }

    let mut values: Vec<serde_json::Value> = read_records(&path)
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();
    values[2]["notification"]["attendee"] = json!("mallory");
    rewrite(&path, &values);

    assert!(matches!(
        verify_journal(&path, ReadMode::Strict),
        Err(StoreError::ChainBroken { seq: 2, .. })
    ));
    assert!(AttendanceStore::open(&path, StoreOptions::default()).is_err());
}

#[test]
fn test_dropped_record_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "One", 1, 2).unwrap();
        store.create_event(&organizer(), "Two", 1, 2).unwrap();
    }

    let values: Vec<serde_json::Value> = read_records(&path)
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 1)
        .map(|(_, r)| serde_json::to_value(r).unwrap())
        .collect();
    rewrite(&path, &values);

    assert!(matches!(
        AttendanceStore::open(&path, StoreOptions::default()),
        Err(StoreError::ChainBroken { seq: 2, .. })
    ));
}

#[test]
fn test_torn_tail_strict_and_permissive() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Launch", 100, 200).unwrap();
        store.check_in(&Identity::new("alice"), 0, 150).unwrap();
    }
    let full_len = fs::metadata(&path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(full_len - 4)
        .unwrap();

    assert!(matches!(
        AttendanceStore::open(&path, StoreOptions::default()),
        Err(StoreError::Journal(_))
    ));

    let permissive = StoreOptions {
        read_mode: ReadMode::Permissive,
        ..StoreOptions::default()
    };
    {
        let store = AttendanceStore::open(&path, permissive.clone()).unwrap();
        assert_eq!(store.event_count(), 1);
        assert!(!store.is_attending(0, &Identity::new("alice")));
        store.check_in(&Identity::new("bob"), 0, 160).unwrap();
    }

    let store = AttendanceStore::open(&path, StoreOptions::default()).unwrap();
    assert!(store.is_attending(0, &Identity::new("bob")));
    assert_eq!(store.chain_tip().0, 3);
}

#[test]
fn test_create_refuses_existing_journal() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    drop(create_store(&path));

    assert!(matches!(
        AttendanceStore::create(&path, organizer(), StoreOptions::default()),
        Err(StoreError::AlreadyInitialized(_))
    ));
}

#[test]
fn test_create_rejects_zero_organizer() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);

    assert!(matches!(
        AttendanceStore::create(&path, Identity::zero(), StoreOptions::default()),
        Err(StoreError::Registry(RegistryError::InvalidAddress))
    ));
    assert!(!path.exists());
}

#[test]
fn test_open_requires_genesis() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    JournalWriter::open(&path, WriteOptions::default())
        .unwrap()
        .finish()
        .unwrap();

    assert!(matches!(
        AttendanceStore::open(&path, StoreOptions::default()),
        Err(StoreError::MissingGenesis)
    ));
}

#[test]
fn test_open_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        AttendanceStore::open(journal_path(&temp_dir), StoreOptions::default()),
        Err(StoreError::Journal(_))
    ));
}

#[test]
fn test_concurrent_check_ins_are_serialized() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    let store = Arc::new(create_store(&path));
    store.create_event(&organizer(), "Rush", 0, 1_000).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let shared = Identity::new("shared");
                let own = Identity::new(format!("worker-{worker}"));
                let shared_ok = store.check_in(&shared, 0, 500).is_ok();
                store.check_in(&own, 0, 500).unwrap();
                shared_ok
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);

    drop(store);
    let report = verify_journal(&path, ReadMode::Strict).unwrap();
    // genesis + create + one shared check-in + eight own check-ins
    assert_eq!(report.records, 11);
}

#[test]
fn test_second_handle_is_refused_while_open() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    let store = create_store(&path);
    store.create_event(&organizer(), "Launch", 100, 200).unwrap();

    assert!(matches!(
        AttendanceStore::open(&path, StoreOptions::default()),
        Err(StoreError::Locked(_))
    ));
    assert!(matches!(
        AttendanceStore::create(&path, organizer(), StoreOptions::default()),
        Err(StoreError::Locked(_))
    ));
    assert!(matches!(
        AttendanceStore::open_read_only(&path, ReadMode::Strict),
        Err(StoreError::Locked(_))
    ));
    assert!(matches!(
        verify_journal(&path, ReadMode::Strict),
        Err(StoreError::Locked(_))
    ));

    // The holder keeps writing; nothing it committed is lost.
    store.check_in(&Identity::new("alice"), 0, 150).unwrap();
    drop(store);

    let reopened = AttendanceStore::open(&path, StoreOptions::default()).unwrap();
    reopened.check_in(&Identity::new("bob"), 0, 160).unwrap();
    drop(reopened);

    let store = AttendanceStore::open(&path, StoreOptions::default()).unwrap();
    assert!(store.is_attending(0, &Identity::new("alice")));
    assert!(store.is_attending(0, &Identity::new("bob")));
    assert_eq!(store.chain_tip().0, 4);
}

#[test]
fn test_concurrent_opens_never_interleave_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Rush", 0, 1_000).unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || loop {
                match AttendanceStore::open(&path, StoreOptions::default()) {
                    Ok(store) => {
                        store
                            .check_in(&Identity::new(format!("worker-{worker}")), 0, 500)
                            .unwrap();
                        return;
                    }
                    Err(StoreError::Locked(_)) => thread::yield_now(),
                    Err(e) => panic!("unexpected open failure: {e}"),
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = AttendanceStore::open_read_only(&path, ReadMode::Strict).unwrap();
    for worker in 0..8 {
        assert!(store.is_attending(0, &Identity::new(format!("worker-{worker}"))));
    }
    // genesis + create + eight check-ins
    assert_eq!(store.report().records, 10);
}

#[test]
fn test_read_only_snapshot_leaves_journal_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = journal_path(&temp_dir);
    {
        let store = create_store(&path);
        store.create_event(&organizer(), "Launch", 100, 200).unwrap();
        store.check_in(&Identity::new("alice"), 0, 150).unwrap();
    }
    // Frame header announcing 10 bytes, followed by only one.
    OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&[0x01, 0, 0, 0, 10, 0, 0, 0, b'{'])
        .unwrap();
    let torn_len = fs::metadata(&path).unwrap().len();

    assert!(matches!(
        AttendanceStore::open_read_only(&path, ReadMode::Strict),
        Err(StoreError::Journal(_))
    ));

    let snapshot = AttendanceStore::open_read_only(&path, ReadMode::Permissive).unwrap();
    assert!(snapshot.is_attending(0, &Identity::new("alice")));
    assert!(!snapshot.is_attending(0, &Identity::new("bob")));
    assert_eq!(snapshot.get_event_details(0).name, "Launch");
    assert_eq!(snapshot.organizer(), &organizer());
    assert_eq!(snapshot.event_count(), 1);
    assert!(snapshot.report().truncated);
    assert_eq!(snapshot.report().valid_len, torn_len - 9);
    assert_eq!(fs::metadata(&path).unwrap().len(), torn_len);
}
