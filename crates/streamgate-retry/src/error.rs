use std::fmt;
use std::time::Duration;
use streamgate_core::ApiError;

/// Outcome of a single failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError<E> {
    /// The operation returned an error.
    Failed(E),
    /// The attempt did not finish within the per-attempt timeout.
    TimedOut(Duration),
}

impl<E> AttemptError<E> {
    /// Returns the operation's error, if the attempt did not time out.
    pub fn inner(&self) -> Option<&E> {
        match self {
            AttemptError::Failed(e) => Some(e),
            AttemptError::TimedOut(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::TimedOut(_))
    }
}

impl<E: fmt::Display> fmt::Display for AttemptError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Failed(e) => write!(f, "{}", e),
            AttemptError::TimedOut(after) => write!(f, "timed out after {:?}", after),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for AttemptError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Failed(e) => Some(e),
            AttemptError::TimedOut(_) => None,
        }
    }
}

/// Failure surfaced by [`Retrier::run`](crate::Retrier::run).
#[derive(Debug, Clone, PartialEq)]
pub enum RetryError<E> {
    /// Every attempt failed.
    Exhausted {
        operation: String,
        attempts: usize,
        last_error: AttemptError<E>,
    },
    /// The retry predicate declared the error non-retryable.
    Rejected { operation: String, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> usize {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Rejected { .. } => 1,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            RetryError::Exhausted { operation, .. } | RetryError::Rejected { operation, .. } => {
                operation
            }
        }
    }

    /// The last error returned by the operation, if any attempt returned one.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error.inner(),
            RetryError::Rejected { error, .. } => Some(error),
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                operation,
                attempts,
                last_error,
            } => write!(
                f,
                "{} failed after {} attempt(s): {}",
                operation, attempts, last_error
            ),
            RetryError::Rejected { operation, error } => {
                write!(f, "{} failed with a non-retryable error: {}", operation, error)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Exhausted { last_error, .. } => Some(last_error),
            RetryError::Rejected { error, .. } => Some(error),
        }
    }
}

impl<E: fmt::Display> From<RetryError<E>> for ApiError {
    fn from(err: RetryError<E>) -> Self {
        match err {
            RetryError::Exhausted {
                operation,
                attempts,
                last_error,
            } => ApiError::upstream_unavailable(&operation, attempts, last_error),
            RetryError::Rejected { operation, error } => {
                ApiError::upstream_unavailable(&operation, 1, error)
            }
        }
    }
}
