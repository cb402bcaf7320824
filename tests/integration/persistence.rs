//! Reopening, lock waits and read-only handles on real files

use crate::common::*;
use burrowdb::{Burrow, BurrowConfig, Error, SequenceKey, CONFIG_FILE_NAME, DATA_FILE_NAME};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn records_and_sequences_survive_reopen() {
    let test = TestDb::new();
    let path = test.path();
    for n in 0..10 {
        test.db.users().create(user(n)).unwrap();
    }
    test.db.events().create(event(100, "persisted")).unwrap();
    let TestDb { db, dir } = test;
    drop(db);

    let db = Burrow::open(&path, &BurrowConfig::default()).unwrap();
    assert_eq!(db.users().count().unwrap(), 10);
    assert_eq!(db.users().get(&SequenceKey(7)).unwrap().name, "user-6");
    assert_eq!(db.event_range().scan_collect(100, 100).unwrap()[0].name, "persisted");

    // Counter continues where it stopped
    assert_eq!(db.users().create(user(10)).unwrap(), SequenceKey(11));
    drop(dir);
}

#[test]
fn second_handle_times_out_while_first_is_open() {
    let test = TestDb::new();
    let config = BurrowConfig {
        lock_timeout_ms: Some(100),
        ..BurrowConfig::default()
    };

    let started = Instant::now();
    let err = Burrow::open(test.path(), &config).err().unwrap();
    assert!(matches!(err, Error::LockTimeout { .. }));
    assert!(err.is_retryable());
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn second_handle_opens_once_first_closes() {
    let test = TestDb::new();
    let path = test.path();
    test.db.users().create(user(1)).unwrap();
    let TestDb { db, dir } = test;

    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        drop(db);
    });

    let config = BurrowConfig {
        lock_timeout_ms: Some(10_000),
        ..BurrowConfig::default()
    };
    let reopened = Burrow::open(&path, &config).unwrap();
    closer.join().unwrap();
    assert_eq!(reopened.users().count().unwrap(), 1);
    drop(dir);
}

#[test]
fn read_only_handle_reads_but_refuses_writes() {
    let test = TestDb::new();
    let path = test.path();
    test.db.users().create(user(1)).unwrap();
    let TestDb { db, dir } = test;
    drop(db);

    let config = BurrowConfig {
        read_only: true,
        ..BurrowConfig::default()
    };
    let db = Burrow::open(&path, &config).unwrap();
    assert_eq!(db.users().get(&SequenceKey(1)).unwrap().name, "user-1");

    assert!(matches!(db.users().create(user(2)), Err(Error::ReadOnly)));
    assert!(matches!(
        db.users().create_batched(db.coalescer(), user(2)),
        Err(Error::ReadOnly)
    ));
    assert!(matches!(db.cleanup_namespaces(), Err(Error::ReadOnly)));
    assert_eq!(db.users().count().unwrap(), 1);
    drop(dir);
}

#[test]
fn open_dir_writes_and_reads_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");

    {
        let db = Burrow::open_dir(&root).unwrap();
        db.ensure_namespaces().unwrap();
        db.generate_users(3).unwrap();
    }
    assert!(root.join(CONFIG_FILE_NAME).exists());
    assert!(root.join(DATA_FILE_NAME).exists());

    let config = BurrowConfig {
        durability: "eventual".to_string(),
        ..BurrowConfig::default()
    };
    config.write_to_file(&root.join(CONFIG_FILE_NAME)).unwrap();

    let db = Burrow::open_dir(&root).unwrap();
    assert_eq!(db.users().count().unwrap(), 3);
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.redb");
    let config = BurrowConfig {
        durability: "sometimes".to_string(),
        ..BurrowConfig::default()
    };
    assert!(matches!(Burrow::open(&path, &config), Err(Error::Config(_))));
    assert!(!path.exists());
}
