//! Explicit fetch cache with a hard staleness bound.
//!
//! Passed into the pipeline rather than living as ambient module state, so
//! eviction policy and lifetime are the caller's decision. An entry past its
//! TTL is evicted on lookup and never served.

use crate::domain::types::{RawSeries, TimeWindow};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    raw: RawSeries,
    fetched_at: Instant,
}

/// Cache of raw fetch results keyed by (ticker, window). Internally locked,
/// so one pipeline instance can be shared across threads.
pub struct FetchCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, TimeWindow), CacheEntry>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a fresh entry, or `None` (after evicting) when missing or
    /// stale. A poisoned lock degrades to a miss rather than propagating.
    pub fn get(&self, ticker: &str, window: &TimeWindow) -> Option<RawSeries> {
        let mut entries = self.entries.lock().ok()?;
        let key = (ticker.to_string(), *window);
        match entries.get(&key) {
            Some(entry) if entry.fetched_at.elapsed() <= self.ttl => Some(entry.raw.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, ticker: &str, window: &TimeWindow, raw: RawSeries) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                (ticker.to_string(), *window),
                CacheEntry {
                    raw,
                    fetched_at: Instant::now(),
                },
            );
        }
    }
}
