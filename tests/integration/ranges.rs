//! Timestamp scans over events written through both write paths

use crate::common::*;
use burrowdb::workload::{fake_event, FAKE_HISTORY_SECS};
use burrowdb::Event;
use rand::rngs::StdRng;
use rand::SeedableRng;

const NOW: i64 = 1_700_000_000;

#[test]
fn scan_matches_filtered_full_listing() {
    let db = TestDb::ephemeral();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        db.events().create(fake_event(&mut rng, NOW)).unwrap();
    }

    let all: Vec<Event> = db.events().list().unwrap().map(|e| e.unwrap()).collect();
    assert_eq!(all.len(), 500);
    // Listing is already in time order
    assert!(all.windows(2).all(|w| (w[0].time, w[0].id) < (w[1].time, w[1].id)));

    for (lower, upper) in [
        (NOW - FAKE_HISTORY_SECS, NOW),
        (NOW - 30 * 86_400, NOW - 7 * 86_400),
        (all[100].time, all[100].time),
        (all[10].time, all[400].time),
    ] {
        let expected: Vec<&Event> = all
            .iter()
            .filter(|e| e.time >= lower && e.time <= upper)
            .collect();
        let scanned = db.event_range().scan_collect(lower, upper).unwrap();
        assert_eq!(scanned.iter().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn batched_events_are_scannable() {
    let db = TestDb::ephemeral();
    for t in [30, 10, 20, 20] {
        db.events()
            .create_batched(db.coalescer(), event(t, "batched"))
            .unwrap();
    }

    let found = db.event_range().scan_collect(20, 20).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0].id < found[1].id);
    assert!(db.event_range().scan_collect(21, 19).unwrap().is_empty());
}

#[test]
fn scan_is_lazy_and_can_stop_early() {
    let db = TestDb::ephemeral();
    for t in 0..1000 {
        db.events().create(event(t, "e")).unwrap();
    }

    let first_three: Vec<i64> = db
        .event_range()
        .scan(250, 999)
        .unwrap()
        .take(3)
        .map(|e| e.unwrap().time)
        .collect();
    assert_eq!(first_three, vec![250, 251, 252]);
}
