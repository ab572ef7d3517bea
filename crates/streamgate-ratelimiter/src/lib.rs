//! Per-client fixed-window rate limiting.
//!
//! Each client key gets a counter and a window reset instant. A request in
//! an elapsed (or missing) window starts a fresh one ending `window` from
//! now; the counter is then incremented and the request is denied once the
//! count exceeds `limit`. So with `limit = N` the N-th request in a window is
//! allowed with `remaining = 0` and the (N+1)-th is denied.
//!
//! Every decision carries the limit, remaining budget and seconds until the
//! window resets, so callers can expose them whatever the outcome.
//!
//! # Examples
//!
//! ```
//! use streamgate_ratelimiter::{RateLimiter, RateLimiterConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = RateLimiter::new(
//!     RateLimiterConfig::builder()
//!         .name("api")
//!         .limit(60)
//!         .window(Duration::from_secs(60))
//!         .build()?,
//! );
//!
//! let admission = limiter.admit("203.0.113.7");
//! assert!(admission.allowed);
//! assert_eq!(admission.remaining, 59);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;
mod store;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimitError;
pub use events::RateLimiterEvent;
pub use store::{MemoryRateLimitStore, RateLimitEntry, RateLimitStore};

use serde::Serialize;
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
use tracing::{debug, warn};

/// Outcome of one admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_seconds: u64,
}

/// A per-client fixed-window rate limiter.
///
/// Cloning is cheap; clones share counters.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimiterConfig>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.config.name)
            .field("limit", &self.config.limit)
            .field("window", &self.config.window)
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "ratelimiter_calls_total",
                "Total number of rate limiter decisions (permitted or rejected)"
            );
            describe_gauge!(
                "ratelimiter_clients",
                "Number of clients with a tracked window"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Counts one request from `client` and decides whether it is admitted.
    pub fn admit(&self, client: &str) -> Admission {
        let config = &*self.config;
        let now = tokio::time::Instant::now();
        let entry = config.store.hit(client, now, config.window);

        let admission = Admission {
            allowed: entry.count <= config.limit,
            limit: config.limit,
            remaining: config.limit.saturating_sub(entry.count),
            reset_seconds: ceil_secs(entry.window_reset_at.saturating_duration_since(now)),
        };

        if admission.allowed {
            #[cfg(feature = "metrics")]
            counter!("ratelimiter_calls_total", "ratelimiter" => config.name.clone(), "result" => "permitted")
                .increment(1);

            config.event_listeners.emit(&RateLimiterEvent::Permitted {
                limiter: config.name.clone(),
                client: client.to_string(),
                timestamp: Instant::now(),
                remaining: admission.remaining,
            });
        } else {
            #[cfg(feature = "metrics")]
            counter!("ratelimiter_calls_total", "ratelimiter" => config.name.clone(), "result" => "rejected")
                .increment(1);

            #[cfg(feature = "tracing")]
            warn!(
                ratelimiter = %config.name,
                client,
                count = entry.count,
                reset_seconds = admission.reset_seconds,
                "rate limit exceeded"
            );

            config.event_listeners.emit(&RateLimiterEvent::Rejected {
                limiter: config.name.clone(),
                client: client.to_string(),
                timestamp: Instant::now(),
                reset_seconds: admission.reset_seconds,
            });
        }

        #[cfg(feature = "metrics")]
        gauge!("ratelimiter_clients", "ratelimiter" => config.name.clone())
            .set(config.store.len() as f64);

        admission
    }

    /// Like [`admit`](Self::admit), but a denial is an error.
    pub fn check(&self, client: &str) -> Result<Admission, RateLimitError> {
        let admission = self.admit(client);
        if admission.allowed {
            Ok(admission)
        } else {
            Err(RateLimitError::Exceeded(admission))
        }
    }

    /// Number of clients with a tracked window (elapsed or not).
    pub fn client_count(&self) -> usize {
        self.config.store.len()
    }

    /// Drops every client whose window has elapsed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.config)
    }

    /// Starts the background cleanup at the configured interval.
    ///
    /// The cleanup stops when the returned handle is dropped.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        let config = Arc::downgrade(&self.config);
        let name = format!("ratelimiter:{}", self.config.name);
        streamgate_core::spawn_sweeper(name, self.config.sweep_interval, move || {
            config.upgrade().map_or(0, |config| purge(&config))
        })
    }
}

fn purge(config: &RateLimiterConfig) -> usize {
    let removed = config.store.purge_expired(tokio::time::Instant::now());

    #[cfg(feature = "metrics")]
    gauge!("ratelimiter_clients", "ratelimiter" => config.name.clone())
        .set(config.store.len() as f64);

    if removed > 0 {
        #[cfg(feature = "tracing")]
        debug!(ratelimiter = %config.name, removed, "dropped elapsed windows");

        config.event_listeners.emit(&RateLimiterEvent::Purged {
            limiter: config.name.clone(),
            timestamp: Instant::now(),
            removed,
        });
    }
    removed
}

/// Whole seconds, rounded up.
fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
