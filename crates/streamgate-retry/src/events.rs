use std::time::{Duration, Instant};
use streamgate_core::events::ComponentEvent;

/// Events emitted by a [`Retrier`](crate::Retrier).
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// Attempt `attempt` failed; the next one starts after `delay`.
    Retry {
        retrier: String,
        operation: String,
        timestamp: Instant,
        attempt: usize,
        delay: Duration,
    },
    /// The operation succeeded after `attempts` attempts.
    Success {
        retrier: String,
        operation: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// Every attempt failed.
    Exhausted {
        retrier: String,
        operation: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The error was rejected by the retry predicate and surfaced immediately.
    Ignored {
        retrier: String,
        operation: String,
        timestamp: Instant,
    },
}

impl RetryEvent {
    /// The operation label passed to `run`.
    pub fn operation(&self) -> &str {
        match self {
            RetryEvent::Retry { operation, .. }
            | RetryEvent::Success { operation, .. }
            | RetryEvent::Exhausted { operation, .. }
            | RetryEvent::Ignored { operation, .. } => operation,
        }
    }
}

impl ComponentEvent for RetryEvent {
    fn kind(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::Ignored { .. } => "ignored",
        }
    }

    fn at(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::Ignored { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            RetryEvent::Retry { retrier, .. }
            | RetryEvent::Success { retrier, .. }
            | RetryEvent::Exhausted { retrier, .. }
            | RetryEvent::Ignored { retrier, .. } => retrier,
        }
    }
}
