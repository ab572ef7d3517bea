use crate::events::CacheEvent;
use crate::store::{CacheStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use streamgate_core::events::EventListeners;
use streamgate_core::ConfigError;

/// Configuration for a [`TtlCache`](crate::TtlCache).
pub struct CacheConfig {
    pub(crate) name: String,
    pub(crate) default_ttl: Duration,
    pub(crate) sweep_interval: Duration,
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

/// Builder for [`CacheConfig`].
pub struct CacheConfigBuilder {
    name: String,
    max_entries: usize,
    default_ttl: Duration,
    sweep_interval: Duration,
    store: Option<Arc<dyn CacheStore>>,
    event_listeners: EventListeners<CacheEvent>,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - max_entries: 10000
    /// - default_ttl: 1 hour
    /// - sweep_interval: 60 seconds
    /// - store: [`MemoryStore`]
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            max_entries: 10_000,
            default_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            store: None,
            event_listeners: EventListeners::new(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Capacity of the default in-memory store. Ignored with a custom store.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// TTL used by [`TtlCache::with_default_ttl`](crate::TtlCache::with_default_ttl).
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Interval of the background expiry sweep.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Uses `store` instead of a fresh [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Called with the key of every hit.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        });
        self
    }

    /// Called with the key of every miss.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let CacheEvent::Miss { key, .. } = event {
                f(key);
            }
        });
        self
    }

    /// Called with the key whenever a caller joins an in-flight compute.
    pub fn on_coalesced<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let CacheEvent::Coalesced { key, .. } = event {
                f(key);
            }
        });
        self
    }

    /// Called with the key of every capacity eviction.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let CacheEvent::Eviction { key, .. } = event {
                f(key);
            }
        });
        self
    }

    pub fn build(self) -> Result<CacheConfig, ConfigError> {
        if self.store.is_none() && self.max_entries == 0 {
            return Err(ConfigError::new("max_entries", "must be at least 1"));
        }
        if self.default_ttl.is_zero() {
            return Err(ConfigError::new("default_ttl", "must be non-zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::new("sweep_interval", "must be non-zero"));
        }

        let store = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::new(self.max_entries)),
        };

        Ok(CacheConfig {
            name: self.name,
            default_ttl: self.default_ttl,
            sweep_interval: self.sweep_interval,
            store,
            event_listeners: self.event_listeners,
        })
    }
}
