//! TTL response cache with compute-if-absent semantics.
//!
//! [`TtlCache::with_cache`] returns a live entry without invoking the compute
//! function; otherwise it computes the value once, stores it with expiry
//! `now + ttl` and returns it. Values are stored serialized (JSON), so every
//! reader of an entry gets byte-identical data.
//!
//! # Features
//!
//! - **Singleflight**: concurrent misses on the same key share one in-flight
//!   computation. If that computation's caller is cancelled, one waiter takes
//!   over.
//! - **No failure caching**: a failed compute is handed to every waiter and
//!   then forgotten.
//! - **Expiry**: checked lazily on read, plus an optional background sweep
//!   ([`TtlCache::spawn_sweeper`]).
//! - **Injectable store**: any [`CacheStore`]; the default is an LRU-bounded
//!   [`MemoryStore`].
//!
//! # Examples
//!
//! ```
//! use streamgate_cache::{CacheConfig, TtlCache};
//! use streamgate_core::ApiError;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache: TtlCache<ApiError> = TtlCache::new(
//!     CacheConfig::builder()
//!         .name("api")
//!         .max_entries(1000)
//!         .build()?,
//! );
//!
//! let titles: Vec<String> = cache
//!     .with_cache("search:naruto:1", Duration::from_secs(3600), || async {
//!         Ok::<_, ApiError>(vec!["Naruto".to_string()])
//!     })
//!     .await?;
//! assert_eq!(titles, vec!["Naruto".to_string()]);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod flight;
mod store;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use error::CacheError;
pub use events::CacheEvent;
pub use store::{CacheEntry, CacheStore, MemoryStore};

use bytes::Bytes;
use flight::{InFlight, Role};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use streamgate_core::SweeperHandle;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// A TTL cache keyed by flat strings (`resource:param1:param2`).
///
/// `E` is the error type of compute functions. It must be `Clone` because a
/// failed compute is delivered to every coalesced waiter.
pub struct TtlCache<E> {
    config: Arc<CacheConfig>,
    in_flight: Arc<InFlight<E>>,
}

impl<E> Clone for TtlCache<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<E> std::fmt::Debug for TtlCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.config.name)
            .field("len", &self.config.store.len())
            .finish()
    }
}

impl<E> TtlCache<E>
where
    E: Clone + Send + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "cache_requests_total",
                "Total number of cache lookups (hits, misses and coalesced waits)"
            );
            describe_counter!("cache_evictions_total", "Total number of cache evictions");
            describe_gauge!("cache_size", "Current number of entries in the cache");
        });

        Self {
            config: Arc::new(config),
            in_flight: Arc::new(InFlight::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the cached value for `key`, computing and storing it with
    /// the given `ttl` on a miss.
    pub async fn with_cache<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let bytes = self
            .with_cache_bytes(key, ttl, || async move {
                let value = compute().await.map_err(CacheError::Compute)?;
                serde_json::to_vec(&value)
                    .map(Bytes::from)
                    .map_err(CacheError::serialization)
            })
            .await?;
        serde_json::from_slice(&bytes).map_err(CacheError::serialization)
    }

    /// [`with_cache`](Self::with_cache) using the configured default TTL.
    pub async fn with_default_ttl<T, F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.with_cache(key, self.config.default_ttl, compute).await
    }

    /// Byte-level compute-if-absent.
    ///
    /// At most one `compute` runs per key at a time. Callers that arrive
    /// while it runs wait for its outcome instead of computing.
    pub async fn with_cache_bytes<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Bytes, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, CacheError<E>>>,
    {
        let store = &self.config.store;

        let guard = loop {
            if let Some(bytes) = store.get(key, tokio::time::Instant::now()) {
                self.record_hit(key);
                return Ok(bytes);
            }

            let role = self
                .in_flight
                .join(key, || store.get(key, tokio::time::Instant::now()));

            match role {
                Role::Ready(bytes) => {
                    self.record_hit(key);
                    return Ok(bytes);
                }
                Role::Leader(guard) => break guard,
                Role::Waiter(mut receiver) => {
                    self.record_coalesced(key);
                    match receiver.recv().await {
                        Ok(Ok(bytes)) => return Ok(bytes),
                        Ok(Err(error)) => return Err(CacheError::Compute(error)),
                        // leader went away without an outcome; try to take over
                        Err(_) => continue,
                    }
                }
            }
        };

        self.record_miss(key);

        match compute().await {
            Ok(bytes) => {
                self.store_bytes(key, bytes.clone(), ttl);
                guard.complete(Ok(bytes.clone()));
                Ok(bytes)
            }
            Err(CacheError::Compute(error)) => {
                guard.complete(Err(error.clone()));
                Err(CacheError::Compute(error))
            }
            Err(other) => {
                // waiters retry as leaders and hit the same problem themselves
                drop(guard);
                Err(other)
            }
        }
    }

    /// Returns the live raw bytes for `key`.
    pub fn get_bytes(&self, key: &str) -> Option<Bytes> {
        self.config.store.get(key, tokio::time::Instant::now())
    }

    /// Returns the live value for `key`, if it deserializes as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_bytes(key)
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    pub fn insert<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError<E>> {
        let bytes = serde_json::to_vec(value).map_err(CacheError::serialization)?;
        self.store_bytes(key, Bytes::from(bytes), ttl);
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.config.store.remove(key);
        self.update_size_gauge();
        removed
    }

    pub fn clear(&self) {
        self.config.store.clear();
        self.update_size_gauge();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.config.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Removes every expired entry now.
    pub fn purge_expired(&self) -> usize {
        purge(&self.config)
    }

    /// Starts the background sweep at the configured interval.
    ///
    /// The sweep stops when the returned handle is dropped.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        let config = Arc::downgrade(&self.config);
        let name = format!("cache:{}", self.config.name);
        streamgate_core::spawn_sweeper(name, self.config.sweep_interval, move || {
            config.upgrade().map_or(0, |config| purge(&config))
        })
    }

    fn store_bytes(&self, key: &str, bytes: Bytes, ttl: Duration) {
        let expires_at = tokio::time::Instant::now() + ttl;
        let evicted = self
            .config
            .store
            .insert(key.to_string(), CacheEntry::new(bytes, expires_at));

        if let Some(evicted) = evicted {
            #[cfg(feature = "metrics")]
            counter!("cache_evictions_total", "cache" => self.config.name.clone()).increment(1);

            #[cfg(feature = "tracing")]
            info!(cache = %self.config.name, key = %evicted, "cache eviction occurred");

            self.config.event_listeners.emit(&CacheEvent::Eviction {
                cache: self.config.name.clone(),
                key: evicted,
                timestamp: Instant::now(),
            });
        }

        self.update_size_gauge();
    }

    fn record_hit(&self, key: &str) {
        #[cfg(feature = "metrics")]
        counter!("cache_requests_total", "cache" => self.config.name.clone(), "result" => "hit")
            .increment(1);

        #[cfg(feature = "tracing")]
        debug!(cache = %self.config.name, key, "cache hit");

        self.config.event_listeners.emit(&CacheEvent::Hit {
            cache: self.config.name.clone(),
            key: key.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn record_miss(&self, key: &str) {
        #[cfg(feature = "metrics")]
        counter!("cache_requests_total", "cache" => self.config.name.clone(), "result" => "miss")
            .increment(1);

        #[cfg(feature = "tracing")]
        debug!(cache = %self.config.name, key, "cache miss");

        self.config.event_listeners.emit(&CacheEvent::Miss {
            cache: self.config.name.clone(),
            key: key.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn record_coalesced(&self, key: &str) {
        #[cfg(feature = "metrics")]
        counter!("cache_requests_total", "cache" => self.config.name.clone(), "result" => "coalesced")
            .increment(1);

        #[cfg(feature = "tracing")]
        debug!(cache = %self.config.name, key, "joined in-flight compute");

        self.config.event_listeners.emit(&CacheEvent::Coalesced {
            cache: self.config.name.clone(),
            key: key.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn update_size_gauge(&self) {
        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone())
            .set(self.config.store.len() as f64);
    }
}

fn purge(config: &CacheConfig) -> usize {
    let removed = config.store.purge_expired(tokio::time::Instant::now());
    if removed > 0 {
        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => config.name.clone()).set(config.store.len() as f64);

        config.event_listeners.emit(&CacheEvent::Purged {
            cache: config.name.clone(),
            removed,
            timestamp: Instant::now(),
        });
    }
    removed
}
