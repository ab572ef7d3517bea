//! Events emitted by a fallback chain.

use std::time::Instant;
use streamgate_core::events::ComponentEvent;

/// Events emitted by a [`FallbackChain`](crate::FallbackChain).
///
/// Candidates are identified by their `Display` form.
#[derive(Debug, Clone)]
pub enum FallbackEvent {
    /// A candidate failed or produced nothing usable; the chain moves on.
    CandidateFailed {
        chain: String,
        timestamp: Instant,
        candidate: String,
        reason: String,
    },
    /// The preferred candidate succeeded.
    Primary {
        chain: String,
        timestamp: Instant,
        candidate: String,
    },
    /// An alternate candidate succeeded.
    Fallback {
        chain: String,
        timestamp: Instant,
        candidate: String,
        attempts: usize,
    },
    /// Every candidate failed.
    Exhausted {
        chain: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl ComponentEvent for FallbackEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::CandidateFailed { .. } => "candidate_failed",
            Self::Primary { .. } => "primary",
            Self::Fallback { .. } => "fallback",
            Self::Exhausted { .. } => "exhausted",
        }
    }

    fn at(&self) -> Instant {
        match self {
            Self::CandidateFailed { timestamp, .. }
            | Self::Primary { timestamp, .. }
            | Self::Fallback { timestamp, .. }
            | Self::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn component(&self) -> &str {
        match self {
            Self::CandidateFailed { chain, .. }
            | Self::Primary { chain, .. }
            | Self::Fallback { chain, .. }
            | Self::Exhausted { chain, .. } => chain,
        }
    }
}
