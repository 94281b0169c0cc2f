//! Record id generation and recency ordering.
//!
//! Ids are `{millis}-{suffix}` where `millis` is the creation timestamp and
//! `suffix` is 11 random base-36 characters. Recency is decided on the parsed
//! numeric timestamp, never on string order, so ids of different digit
//! widths still sort correctly.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicI64, Ordering};

const SUFFIX_LEN: usize = 11;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hands out `(timestamp, id)` pairs with strictly increasing timestamps.
///
/// When two records are created within the same millisecond the second one
/// is stamped one millisecond later, so creation order and timestamp order
/// always agree for a single generator.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next `(timestamp, id)` for a record created at `now`.
    pub fn next(&self, now: i64) -> (i64, String) {
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let timestamp = now.max(last.saturating_add(1));
            match self.last.compare_exchange_weak(
                last,
                timestamp,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return (timestamp, format!("{timestamp}-{}", random_suffix())),
                Err(actual) => last = actual,
            }
        }
    }
}

fn random_suffix() -> String {
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(char::from(BASE36[(n % 36) as usize]));
        n /= 36;
    }
    suffix
}

/// Millisecond timestamp encoded in an id or in a full `{prefix}:{id}` key.
pub fn parse_timestamp(id_or_key: &str) -> Option<i64> {
    let id = id_or_key.rsplit(':').next()?;
    id.split('-').next()?.parse().ok()
}

/// Newest-first comparison of ids or keys.
///
/// Larger timestamps come first; ids without a parsable timestamp go last;
/// ties fall back to descending string order.
pub fn newest_first(a: &str, b: &str) -> CmpOrdering {
    parse_timestamp(b)
        .cmp(&parse_timestamp(a))
        .then_with(|| b.cmp(a))
}
