//! Synthetic users and events for load generation and benchmarks

use burrow_primitives::{Event, User};
use rand::seq::SliceRandom;
use rand::Rng;

/// Seconds in the window fake timestamps are drawn from
pub const FAKE_HISTORY_SECS: i64 = 60 * 60 * 24 * 365;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Edsger", "Frances", "Grace", "Hedy", "Ivan", "John",
    "Katherine", "Linus", "Margaret", "Niklaus", "Radia", "Ken", "Dennis", "Shafi", "Tony",
    "Whitfield",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Liskov", "Shannon", "Dijkstra", "Allen", "Hopper", "Lamarr",
    "Sutherland", "McCarthy", "Johnson", "Torvalds", "Hamilton", "Wirth", "Perlman",
    "Thompson", "Ritchie", "Goldwasser", "Hoare", "Diffie",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

fn fake_name<G: Rng + ?Sized>(rng: &mut G) -> (&'static str, &'static str) {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Lovelace");
    (first, last)
}

fn fake_timestamp<G: Rng + ?Sized>(rng: &mut G, now: i64) -> i64 {
    rng.gen_range(now.saturating_sub(FAKE_HISTORY_SECS)..=now)
}

/// A random user created at some point in the year before `now`
///
/// `id` is left at 0; the repository assigns it.
pub fn fake_user<G: Rng + ?Sized>(rng: &mut G, now: i64) -> User {
    let (first, last) = fake_name(rng);
    let domain = DOMAINS.choose(rng).copied().unwrap_or("example.com");
    User {
        id: 0,
        name: format!("{} {}", first, last),
        gender: rng.gen_range(0..=1),
        age: rng.gen_range(0..=100),
        phone: format!(
            "{:03}-{:03}-{:04}",
            rng.gen_range(200..1000),
            rng.gen_range(0..1000),
            rng.gen_range(0..10_000)
        ),
        email: format!(
            "{}.{}{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            rng.gen_range(0..1000),
            domain
        ),
        created_at: fake_timestamp(rng, now),
    }
}

/// A random event that happened at some point in the year before `now`
pub fn fake_event<G: Rng + ?Sized>(rng: &mut G, now: i64) -> Event {
    let (first, last) = fake_name(rng);
    Event {
        id: 0,
        time: fake_timestamp(rng, now),
        name: format!("{} {}", first, last),
        kind: rng.gen(),
        cancel: rng.gen(),
    }
}

/// Current Unix time in seconds
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Split `n` records over `workers`, spreading the remainder over the first ones
pub(crate) fn split_work(n: usize, workers: usize) -> Vec<usize> {
    let base = n / workers;
    let extra = n % workers;
    (0..workers)
        .map(|i| base + usize::from(i < extra))
        .collect()
}
