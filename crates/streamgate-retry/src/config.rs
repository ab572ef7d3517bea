use crate::backoff::{ExponentialBackoff, FixedInterval, IntervalFunction};
use crate::events::RetryEvent;
use std::sync::Arc;
use std::time::Duration;
use streamgate_core::events::EventListeners;
use streamgate_core::ConfigError;

/// Decides whether an error is worth another attempt.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Configuration for a [`Retrier`](crate::Retrier).
pub struct RetryConfig<E> {
    pub(crate) name: String,
    pub(crate) max_attempts: usize,
    pub(crate) interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) attempt_timeout: Option<Duration>,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
}

impl<E> RetryConfig<E> {
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.interval_fn.next_interval(attempt.saturating_sub(1))
    }

    pub(crate) fn should_retry(&self, error: &E) -> bool {
        self.retry_predicate
            .as_ref()
            .map_or(true, |predicate| predicate(error))
    }
}

impl<E> std::fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("name", &self.name)
            .field("max_attempts", &self.max_attempts)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<E> {
    name: String,
    max_attempts: usize,
    base_delay: Duration,
    multiplier: f64,
    max_delay: Option<Duration>,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    attempt_timeout: Option<Duration>,
    retry_predicate: Option<RetryPredicate<E>>,
    event_listeners: EventListeners<RetryEvent>,
}

impl<E> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Creates a builder with defaults.
    ///
    /// Defaults:
    /// - max_attempts: 3
    /// - base_delay: 1000ms, doubling after every failure
    /// - attempt_timeout: none
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            multiplier: 2.0,
            max_delay: None,
            interval_fn: None,
            attempt_timeout: None,
            retry_predicate: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name used in events, logs and metrics labels.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Total attempts including the first one; must be at least 1.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay after the first failure of the exponential schedule.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Growth factor of the exponential schedule (default 2.0).
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the exponential schedule.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Replaces the exponential schedule with a constant delay.
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.interval_fn = Some(Arc::new(FixedInterval::new(delay)));
        self
    }

    /// Replaces the exponential schedule with a custom one.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Bounds every attempt; an attempt that exceeds it counts as failed.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Only errors for which `predicate` returns true are retried; the rest
    /// surface immediately as [`RetryError::Rejected`](crate::RetryError::Rejected).
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }

    /// Called with the failed attempt number (1-based) and the delay before
    /// the next one.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        });
        self
    }

    /// Called with the number of attempts it took to succeed.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        });
        self
    }

    /// Called once every attempt has failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        });
        self
    }

    /// Called when the retry predicate rejects an error.
    pub fn on_ignored<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if matches!(event, RetryEvent::Ignored { .. }) {
                f();
            }
        });
        self
    }

    /// Validates the settings and builds the configuration.
    pub fn build(self) -> Result<RetryConfig<E>, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("max_attempts", "must be at least 1"));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::new(
                "multiplier",
                format!("must be a finite number >= 1.0, got {}", self.multiplier),
            ));
        }
        if self.attempt_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::new("attempt_timeout", "must be non-zero"));
        }

        let interval_fn = match self.interval_fn {
            Some(custom) => custom,
            None => {
                let mut exponential =
                    ExponentialBackoff::new(self.base_delay).multiplier(self.multiplier);
                if let Some(max) = self.max_delay {
                    exponential = exponential.max_interval(max);
                }
                Arc::new(exponential)
            }
        };

        Ok(RetryConfig {
            name: self.name,
            max_attempts: self.max_attempts,
            interval_fn,
            attempt_timeout: self.attempt_timeout,
            retry_predicate: self.retry_predicate,
            event_listeners: self.event_listeners,
        })
    }
}
