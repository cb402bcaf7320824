//! Coalesced creation from many concurrent writers

use crate::common::*;
use burrowdb::{Burrow, Error, Repository, SequenceKey, Store, User};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn twenty_writers_create_exactly_one_thousand_users() {
    let db = Arc::new(TestDb::ephemeral());
    let barrier = Arc::new(Barrier::new(20));

    let handles: Vec<_> = (0..20u64)
        .map(|worker| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..50u64)
                    .map(|i| {
                        db.users()
                            .create_batched(db.coalescer(), user(worker * 50 + i))
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let returned: Vec<SequenceKey> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let listed: Vec<User> = db.users().list().unwrap().map(|u| u.unwrap()).collect();
    assert_eq!(listed.len(), 1000);

    let ids: HashSet<u64> = listed.iter().map(|u| u.id).collect();
    assert_eq!(ids.len(), 1000);
    assert!(ids.iter().all(|id| (1..=1000).contains(id)));

    let returned: HashSet<u64> = returned.into_iter().map(|k| k.0).collect();
    assert_eq!(returned, ids);

    // Fewer commits than records
    let stats = db.coalescer().stats();
    assert_eq!(stats.requests_committed, 1000);
    assert!(stats.groups_committed <= 1000);
}

#[test]
fn concurrent_unbatched_creates_get_unique_keys() {
    let store = Arc::new(Store::ephemeral().unwrap());
    let db = Burrow::from_store(Arc::clone(&store), test_coalescer()).unwrap();
    db.ensure_namespaces().unwrap();
    let users: Repository<User> = Repository::new(store);

    let handles: Vec<_> = (0..8u64)
        .map(|worker| {
            let users = users.clone();
            thread::spawn(move || {
                (0..25u64)
                    .map(|i| users.create(user(worker * 25 + i)).unwrap().0)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut keys: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    keys.sort_unstable();
    assert_eq!(keys, (1..=200).collect::<Vec<_>>());
}

#[test]
fn generate_concurrently_creates_n_records() {
    let db = TestDb::ephemeral();
    db.generate_users_concurrently(300, 6).unwrap();
    db.generate_events_concurrently(301, 4).unwrap();
    assert_eq!(db.users().count().unwrap(), 300);
    assert_eq!(db.events().count().unwrap(), 301);
}

#[test]
fn batched_create_into_missing_namespace_fails_every_caller() {
    let db = TestDb::ephemeral();
    db.cleanup_namespaces().unwrap();

    let err = db
        .users()
        .create_batched(db.coalescer(), user(1))
        .unwrap_err();
    match err {
        Error::CommitFailure(msg) => assert!(msg.contains("Users")),
        other => panic!("expected CommitFailure, got {:?}", other),
    }
}

#[test]
fn submit_after_shutdown_is_rejected() {
    let db = TestDb::ephemeral();
    db.users().create_batched(db.coalescer(), user(1)).unwrap();
    db.coalescer().shutdown();

    let err = db
        .users()
        .create_batched(db.coalescer(), user(2))
        .unwrap_err();
    assert!(matches!(err, Error::CoalescerClosed));
    // Single-transaction path still works
    assert_eq!(db.users().create(user(3)).unwrap(), SequenceKey(2));
}
