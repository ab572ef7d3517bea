use std::time::Instant;
use streamgate_core::events::ComponentEvent;

/// Events emitted by a [`TtlCache`](crate::TtlCache).
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A live entry was served without computing.
    Hit {
        cache: String,
        key: String,
        timestamp: Instant,
    },
    /// No live entry existed; this caller computes the value.
    Miss {
        cache: String,
        key: String,
        timestamp: Instant,
    },
    /// The caller joined another caller's in-flight computation.
    Coalesced {
        cache: String,
        key: String,
        timestamp: Instant,
    },
    /// An entry was evicted to stay within capacity.
    Eviction {
        cache: String,
        key: String,
        timestamp: Instant,
    },
    /// A sweep removed expired entries.
    Purged {
        cache: String,
        removed: usize,
        timestamp: Instant,
    },
}

impl ComponentEvent for CacheEvent {
    fn kind(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Coalesced { .. } => "coalesced",
            CacheEvent::Eviction { .. } => "eviction",
            CacheEvent::Purged { .. } => "purged",
        }
    }

    fn at(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Coalesced { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. }
            | CacheEvent::Purged { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            CacheEvent::Hit { cache, .. }
            | CacheEvent::Miss { cache, .. }
            | CacheEvent::Coalesced { cache, .. }
            | CacheEvent::Eviction { cache, .. }
            | CacheEvent::Purged { cache, .. } => cache,
        }
    }
}
