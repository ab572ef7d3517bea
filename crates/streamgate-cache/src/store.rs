//! Cache storage.

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tokio::time::Instant;

/// A serialized value with its absolute expiry.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub value: Bytes,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(value: Bytes, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// An entry stays live up to and including its expiry instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Backing store of a [`TtlCache`](crate::TtlCache).
///
/// Implementations must be safe to call concurrently; every method is
/// synchronous and must not block for long.
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, removing it if it has expired.
    fn get(&self, key: &str, now: Instant) -> Option<Bytes>;

    /// Inserts or overwrites `key`. Returns the key of an entry evicted to
    /// make room, if any.
    fn insert(&self, key: String, entry: CacheEntry) -> Option<String>;

    /// Removes `key`, returning whether it was present.
    fn remove(&self, key: &str) -> bool;

    /// Removes every entry.
    fn clear(&self);

    /// Number of stored entries, expired or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry expired at `now`, returning how many were removed.
    fn purge_expired(&self, now: Instant) -> usize;
}

/// In-memory store bounded by LRU eviction.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_entries` (clamped to at least 1).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("MemoryStore")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str, now: Instant) -> Option<Bytes> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn insert(&self, key: String, entry: CacheEntry) -> Option<String> {
        let mut entries = self.entries.lock();
        // push also returns the previous value of an overwritten key
        match entries.push(key.clone(), entry) {
            Some((old_key, _)) if old_key != key => Some(old_key),
            _ => None,
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }
}
