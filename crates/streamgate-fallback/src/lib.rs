//! Ordered fallback across alternate candidates.
//!
//! A [`FallbackChain`] holds a static, ordered list of alternates. Executing
//! it tries the caller's preferred candidate first, then every alternate that
//! has not been tried yet, in list order. A candidate is passed over when it
//! returns an error, produces a value the caller deems unusable, or panics;
//! none of those stop the chain. Only running out of candidates is terminal,
//! and the error then carries the full attempt log.
//!
//! # Examples
//!
//! ```
//! use streamgate_fallback::FallbackChain;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let chain = FallbackChain::builder()
//!     .name("mirrors")
//!     .candidates(["eu", "us", "ap"])
//!     .build()?;
//!
//! let resolved = chain
//!     .execute("us", |mirror| async move {
//!         if mirror == "us" {
//!             Err("connection refused")
//!         } else {
//!             Ok(format!("payload from {}", mirror))
//!         }
//!     })
//!     .await?;
//!
//! assert_eq!(resolved.candidate, "eu");
//! assert!(resolved.used_fallback);
//! assert_eq!(resolved.attempts.len(), 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod events;

pub use config::{FallbackChainBuilder, FallbackConfig};
pub use error::{Attempt, AttemptOutcome, FallbackError};
pub use events::FallbackEvent;

use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// The first usable result of a chain execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<C, T> {
    /// The candidate that produced `value`.
    pub candidate: C,
    pub value: T,
    /// Whether `candidate` differs from the preferred one.
    pub used_fallback: bool,
    /// Candidates passed over before `candidate`, in attempt order.
    pub attempts: Vec<Attempt<C>>,
}

/// An ordered fallback chain over candidates of type `C`.
///
/// Cloning is cheap; clones share the candidate list.
pub struct FallbackChain<C> {
    config: Arc<FallbackConfig<C>>,
}

impl<C> Clone for FallbackChain<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for FallbackChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("name", &self.config.name)
            .field("candidates", &self.config.candidates)
            .finish()
    }
}

impl<C> FallbackChain<C> {
    pub fn builder() -> FallbackChainBuilder<C> {
        FallbackChainBuilder::new()
    }

    pub(crate) fn new(config: FallbackConfig<C>) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_calls_total",
                "Total number of fallback chain executions by outcome"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &FallbackConfig<C> {
        &self.config
    }

    /// The alternates, in fallback order.
    pub fn candidates(&self) -> &[C] {
        &self.config.candidates
    }
}

impl<C> FallbackChain<C>
where
    C: Clone + PartialEq + fmt::Display,
{
    /// The order in which candidates are tried for `preferred`: the preferred
    /// candidate, then every alternate not equal to it.
    pub fn plan(&self, preferred: &C) -> Vec<C> {
        let mut order = vec![preferred.clone()];
        for candidate in &self.config.candidates {
            if !order.contains(candidate) {
                order.push(candidate.clone());
            }
        }
        order
    }

    /// Runs `attempt` for each candidate until one succeeds.
    pub async fn execute<T, E, F, Fut>(
        &self,
        preferred: C,
        attempt: F,
    ) -> Result<Resolved<C, T>, FallbackError<C>>
    where
        E: fmt::Display,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with(preferred, |_| true, attempt).await
    }

    /// Runs `attempt` for each candidate until one yields a value accepted by
    /// `is_usable`.
    pub async fn execute_with<T, E, U, F, Fut>(
        &self,
        preferred: C,
        is_usable: U,
        mut attempt: F,
    ) -> Result<Resolved<C, T>, FallbackError<C>>
    where
        E: fmt::Display,
        U: Fn(&T) -> bool,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let config = &*self.config;
        let mut attempts: Vec<Attempt<C>> = Vec::new();

        for (index, candidate) in self.plan(&preferred).into_iter().enumerate() {
            let outcome = AssertUnwindSafe(attempt(candidate.clone()))
                .catch_unwind()
                .await;

            let reason = match outcome {
                Ok(Ok(value)) if is_usable(&value) => {
                    let used_fallback = index > 0;
                    self.record_success(&candidate, used_fallback, attempts.len() + 1);
                    return Ok(Resolved {
                        candidate,
                        value,
                        used_fallback,
                        attempts,
                    });
                }
                Ok(Ok(_)) => AttemptOutcome::Empty,
                Ok(Err(error)) => AttemptOutcome::Failed(error.to_string()),
                Err(panic) => AttemptOutcome::Panicked(panic_message(panic.as_ref())),
            };

            #[cfg(feature = "tracing")]
            warn!(fallback = %config.name, candidate = %candidate, reason = %reason, "candidate failed");

            config.event_listeners.emit(&FallbackEvent::CandidateFailed {
                chain: config.name.clone(),
                timestamp: Instant::now(),
                candidate: candidate.to_string(),
                reason: reason.to_string(),
            });

            attempts.push(Attempt {
                candidate,
                outcome: reason,
            });
        }

        #[cfg(feature = "metrics")]
        counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "exhausted")
            .increment(1);

        #[cfg(feature = "tracing")]
        warn!(fallback = %config.name, attempts = attempts.len(), "all candidates failed");

        config.event_listeners.emit(&FallbackEvent::Exhausted {
            chain: config.name.clone(),
            timestamp: Instant::now(),
            attempts: attempts.len(),
        });

        Err(FallbackError::Exhausted { attempts })
    }

    fn record_success(&self, candidate: &C, used_fallback: bool, attempts: usize) {
        let config = &*self.config;

        if used_fallback {
            #[cfg(feature = "metrics")]
            counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "fallback")
                .increment(1);

            #[cfg(feature = "tracing")]
            info!(fallback = %config.name, candidate = %candidate, attempts, "served by fallback candidate");

            config.event_listeners.emit(&FallbackEvent::Fallback {
                chain: config.name.clone(),
                timestamp: Instant::now(),
                candidate: candidate.to_string(),
                attempts,
            });
        } else {
            #[cfg(feature = "metrics")]
            counter!("fallback_calls_total", "fallback" => config.name.clone(), "result" => "primary")
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(fallback = %config.name, candidate = %candidate, "served by preferred candidate");

            config.event_listeners.emit(&FallbackEvent::Primary {
                chain: config.name.clone(),
                timestamp: Instant::now(),
                candidate: candidate.to_string(),
            });
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
