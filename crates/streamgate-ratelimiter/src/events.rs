use std::time::Instant;
use streamgate_core::events::ComponentEvent;

/// Events emitted by a [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    Permitted {
        limiter: String,
        client: String,
        timestamp: Instant,
        remaining: u64,
    },
    Rejected {
        limiter: String,
        client: String,
        timestamp: Instant,
        reset_seconds: u64,
    },
    /// A sweep dropped clients whose window had elapsed.
    Purged {
        limiter: String,
        timestamp: Instant,
        removed: usize,
    },
}

impl ComponentEvent for RateLimiterEvent {
    fn kind(&self) -> &'static str {
        match self {
            RateLimiterEvent::Permitted { .. } => "permitted",
            RateLimiterEvent::Rejected { .. } => "rejected",
            RateLimiterEvent::Purged { .. } => "purged",
        }
    }

    fn at(&self) -> Instant {
        match self {
            RateLimiterEvent::Permitted { timestamp, .. }
            | RateLimiterEvent::Rejected { timestamp, .. }
            | RateLimiterEvent::Purged { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            RateLimiterEvent::Permitted { limiter, .. }
            | RateLimiterEvent::Rejected { limiter, .. }
            | RateLimiterEvent::Purged { limiter, .. } => limiter,
        }
    }
}
