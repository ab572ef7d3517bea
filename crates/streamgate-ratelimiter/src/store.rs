//! Per-client window counters.

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One client's counter for its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u64,
    pub window_reset_at: Instant,
}

impl RateLimitEntry {
    /// A window is over once `now` reaches its reset instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }
}

/// Backing store of a [`RateLimiter`](crate::RateLimiter).
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` and returns the updated entry.
    ///
    /// Must be atomic per key: if the key has no entry or its window has
    /// elapsed, a fresh window ending at `now + window` is started before the
    /// count is incremented.
    fn hit(&self, key: &str, now: Instant, window: Duration) -> RateLimitEntry;

    /// Current entry for `key`, without counting a request.
    fn peek(&self, key: &str) -> Option<RateLimitEntry>;

    /// Removes entries whose window has elapsed at `now`.
    fn purge_expired(&self, now: Instant) -> usize;

    /// Number of tracked clients.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn hit(&self, key: &str, now: Instant, window: Duration) -> RateLimitEntry {
        let fresh = RateLimitEntry {
            count: 0,
            window_reset_at: now + window,
        };

        let mut entries = self.entries.lock();
        match entries.get_mut(key) {
            Some(entry) => {
                if entry.is_expired(now) {
                    *entry = fresh;
                }
                entry.count = entry.count.saturating_add(1);
                *entry
            }
            None => {
                let entry = RateLimitEntry { count: 1, ..fresh };
                entries.insert(key.to_string(), entry);
                entry
            }
        }
    }

    fn peek(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.lock().get(key).copied()
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}
