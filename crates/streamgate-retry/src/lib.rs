//! Bounded exponential-backoff retries for unreliable upstream calls.
//!
//! A [`Retrier`] runs a zero-argument async operation up to `max_attempts`
//! times. After failed attempt `n` it sleeps `base_delay * 2^(n-1)` before the
//! next one; once the budget is spent the last failure is surfaced as
//! [`RetryError::Exhausted`], annotated with the operation name and attempt
//! count. Every failed attempt is logged at `warn`.
//!
//! Each attempt can be bounded by a timeout. A timed-out attempt counts
//! against the budget like any other failure.
//!
//! # Examples
//!
//! ```
//! use streamgate_retry::{Retrier, RetryConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retrier: Retrier<std::io::Error> = RetryConfig::builder()
//!     .name("upstream")
//!     .max_attempts(3)
//!     .base_delay(Duration::from_millis(1000))
//!     .attempt_timeout(Duration::from_secs(10))
//!     .on_retry(|attempt, delay| println!("attempt {} failed, waiting {:?}", attempt, delay))
//!     .build()?
//!     .into();
//!
//! let body = retrier
//!     .run("search(naruto, 1)", || async { Ok::<_, std::io::Error>("results") })
//!     .await?;
//! assert_eq!(body, "results");
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod error;
mod events;

pub use backoff::{ExponentialBackoff, FixedInterval, FnInterval, IntervalFunction};
pub use config::{RetryConfig, RetryConfigBuilder, RetryPredicate};
pub use error::{AttemptError, RetryError};
pub use events::RetryEvent;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Runs fallible async operations with bounded retries.
///
/// Cloning is cheap; clones share the configuration.
pub struct Retrier<E> {
    config: Arc<RetryConfig<E>>,
}

impl<E> Clone for Retrier<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<E> From<RetryConfig<E>> for Retrier<E> {
    fn from(config: RetryConfig<E>) -> Self {
        Self::new(config)
    }
}

impl<E> fmt::Debug for Retrier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("name", &self.config.name)
            .field("max_attempts", &self.config.max_attempts)
            .field("attempt_timeout", &self.config.attempt_timeout)
            .finish()
    }
}

impl<E> Retrier<E> {
    pub fn new(config: RetryConfig<E>) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "retry_calls_total",
                "Total number of retried operations by outcome"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of attempts made, including first attempts"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }

    /// Runs `op` until it succeeds, the retry predicate rejects its error, or
    /// `max_attempts` attempts have failed.
    ///
    /// `operation` labels logs, events and the surfaced error. Dropping the
    /// returned future cancels the in-flight attempt and any pending delay.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let config = &*self.config;
        let mut attempt = 0;

        loop {
            attempt += 1;

            #[cfg(feature = "metrics")]
            counter!("retry_attempts_total", "retry" => config.name.clone()).increment(1);

            let outcome = match config.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(result) => result.map_err(AttemptError::Failed),
                    Err(_) => Err(AttemptError::TimedOut(limit)),
                },
                None => op().await.map_err(AttemptError::Failed),
            };

            let error = match outcome {
                Ok(value) => {
                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "success")
                        .increment(1);

                    #[cfg(feature = "tracing")]
                    if attempt > 1 {
                        debug!(retry = %config.name, operation, attempts = attempt, "succeeded after retry");
                    }

                    config.event_listeners.emit(&RetryEvent::Success {
                        retrier: config.name.clone(),
                        operation: operation.to_string(),
                        timestamp: Instant::now(),
                        attempts: attempt,
                    });
                    return Ok(value);
                }
                Err(error) => error,
            };

            let error = match error {
                AttemptError::Failed(inner) if !config.should_retry(&inner) => {
                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "rejected")
                        .increment(1);

                    #[cfg(feature = "tracing")]
                    warn!(
                        retry = %config.name,
                        operation,
                        attempt,
                        error = %inner,
                        "non-retryable failure"
                    );

                    config.event_listeners.emit(&RetryEvent::Ignored {
                        retrier: config.name.clone(),
                        operation: operation.to_string(),
                        timestamp: Instant::now(),
                    });

                    return Err(RetryError::Rejected {
                        operation: operation.to_string(),
                        error: inner,
                    });
                }
                other => other,
            };

            #[cfg(feature = "tracing")]
            warn!(
                retry = %config.name,
                operation,
                attempt,
                max_attempts = config.max_attempts,
                error = %error,
                "attempt failed"
            );

            if attempt >= config.max_attempts {
                #[cfg(feature = "metrics")]
                counter!("retry_calls_total", "retry" => config.name.clone(), "result" => "exhausted")
                    .increment(1);

                #[cfg(feature = "tracing")]
                warn!(retry = %config.name, operation, attempts = attempt, "retries exhausted");

                config.event_listeners.emit(&RetryEvent::Exhausted {
                    retrier: config.name.clone(),
                    operation: operation.to_string(),
                    timestamp: Instant::now(),
                    attempts: attempt,
                });

                return Err(RetryError::Exhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last_error: error,
                });
            }

            let delay = config.delay_after(attempt);
            config.event_listeners.emit(&RetryEvent::Retry {
                retrier: config.name.clone(),
                operation: operation.to_string(),
                timestamp: Instant::now(),
                attempt,
                delay,
            });

            tokio::time::sleep(delay).await;
        }
    }
}
