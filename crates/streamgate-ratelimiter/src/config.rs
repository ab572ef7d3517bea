use crate::events::RateLimiterEvent;
use crate::store::{MemoryRateLimitStore, RateLimitStore};
use std::sync::Arc;
use std::time::Duration;
use streamgate_core::events::EventListeners;
use streamgate_core::ConfigError;

/// Configuration for a [`RateLimiter`](crate::RateLimiter).
pub struct RateLimiterConfig {
    pub(crate) name: String,
    pub(crate) limit: u64,
    pub(crate) window: Duration,
    pub(crate) sweep_interval: Duration,
    pub(crate) store: Arc<dyn RateLimitStore>,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
}

impl RateLimiterConfig {
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests admitted per client per window.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

/// Builder for [`RateLimiterConfig`].
pub struct RateLimiterConfigBuilder {
    name: String,
    limit: u64,
    window: Duration,
    sweep_interval: Duration,
    store: Option<Arc<dyn RateLimitStore>>,
    event_listeners: EventListeners<RateLimiterEvent>,
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterConfigBuilder {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - limit: 60 requests
    /// - window: 60 seconds
    /// - sweep_interval: 60 seconds
    /// - store: [`MemoryRateLimitStore`]
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            limit: 60,
            window: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            store: None,
            event_listeners: EventListeners::new(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Requests admitted per client per window; the next one is denied.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Interval of the background cleanup of elapsed windows.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Called with the client key and remaining budget of every admitted
    /// request.
    pub fn on_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u64) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let RateLimiterEvent::Permitted {
                client, remaining, ..
            } = event
            {
                f(client, *remaining);
            }
        });
        self
    }

    /// Called with the client key and reset hint of every denied request.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u64) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let RateLimiterEvent::Rejected {
                client,
                reset_seconds,
                ..
            } = event
            {
                f(client, *reset_seconds);
            }
        });
        self
    }

    pub fn build(self) -> Result<RateLimiterConfig, ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::new("limit", "must be at least 1"));
        }
        if self.window.is_zero() {
            return Err(ConfigError::new("window", "must be non-zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::new("sweep_interval", "must be non-zero"));
        }

        Ok(RateLimiterConfig {
            name: self.name,
            limit: self.limit,
            window: self.window,
            sweep_interval: self.sweep_interval,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryRateLimitStore::new())),
            event_listeners: self.event_listeners,
        })
    }
}
