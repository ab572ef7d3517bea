//! Error and attempt-log types for the fallback chain.

use std::fmt;

/// Why a candidate was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt returned an error.
    Failed(String),
    /// The attempt succeeded but its value was not usable.
    Empty,
    /// The attempt panicked.
    Panicked(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "failed: {}", e),
            Self::Empty => write!(f, "no usable result"),
            Self::Panicked(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// One entry of the ordered attempt log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt<C> {
    pub candidate: C,
    pub outcome: AttemptOutcome,
}

/// Error type for the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackError<C> {
    /// Every candidate, preferred one first, failed or was unusable.
    Exhausted { attempts: Vec<Attempt<C>> },
}

impl<C> FallbackError<C> {
    /// The attempt log, in attempt order.
    pub fn attempts(&self) -> &[Attempt<C>] {
        match self {
            Self::Exhausted { attempts } => attempts,
        }
    }

    /// The candidates that were tried, in attempt order.
    pub fn tried(&self) -> impl Iterator<Item = &C> {
        self.attempts().iter().map(|a| &a.candidate)
    }
}

impl<C: fmt::Display> fmt::Display for FallbackError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts } => {
                write!(f, "all {} candidate(s) failed", attempts.len())?;
                for (i, attempt) in attempts.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{}{} {}", sep, attempt.candidate, attempt.outcome)?;
                }
                Ok(())
            }
        }
    }
}

impl<C: fmt::Debug + fmt::Display> std::error::Error for FallbackError<C> {}
