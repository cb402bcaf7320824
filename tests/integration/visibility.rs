//! Group commits become visible all at once

use crate::common::*;
use burrowdb::{Burrow, CoalescerConfig, Error, Store};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const GROUP: usize = 5;
const ROUNDS: usize = 20;

fn grouped_db() -> Arc<Burrow> {
    init_tracing();
    let store = Arc::new(Store::ephemeral().unwrap());
    let db = Burrow::from_store(
        store,
        CoalescerConfig {
            max_batch_size: GROUP,
            max_wait: Duration::from_secs(30),
        },
    )
    .unwrap();
    db.ensure_namespaces().unwrap();
    Arc::new(db)
}

#[test]
fn readers_never_observe_a_partial_group() {
    let db = grouped_db();
    let stop = Arc::new(AtomicBool::new(false));
    let observations = Arc::new(AtomicU64::new(0));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let db = Arc::clone(&db);
            let stop = Arc::clone(&stop);
            let observations = Arc::clone(&observations);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let count = db.users().count().unwrap();
                    assert_eq!(count % GROUP as u64, 0, "saw a partial group: {}", count);
                    let listed = db.users().list().unwrap().count() as u64;
                    assert_eq!(listed % GROUP as u64, 0);
                    observations.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for round in 0..ROUNDS {
        let barrier = Arc::new(Barrier::new(GROUP));
        let writers: Vec<_> = (0..GROUP)
            .map(|i| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    db.users()
                        .create_batched(db.coalescer(), user((round * GROUP + i) as u64))
                        .unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(observations.load(Ordering::Relaxed) > 0);
    assert_eq!(db.users().count().unwrap(), (GROUP * ROUNDS) as u64);
    assert_eq!(db.coalescer().stats().groups_committed, ROUNDS as u64);
}

#[test]
fn failed_group_leaves_no_trace() {
    let db = grouped_db();
    let barrier = Arc::new(Barrier::new(GROUP));

    let handles: Vec<_> = (0..GROUP)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i == 0 {
                    db.coalescer().submit(|txn| {
                        txn.namespace("NoSuchNamespace")?;
                        Ok(())
                    })
                } else {
                    db.users()
                        .create_batched(db.coalescer(), user(i as u64))
                        .map(|_| ())
                }
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(Error::CommitFailure(_))));
    }

    assert_eq!(db.users().count().unwrap(), 0);
    // Sequence values of the aborted group were not consumed
    assert_eq!(db.users().create(user(0)).unwrap().0, 1);
}
