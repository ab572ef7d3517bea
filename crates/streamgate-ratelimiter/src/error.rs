use crate::Admission;
use std::fmt;
use streamgate_core::ApiError;

/// Errors that can occur when checking the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// The client exhausted its budget for the current window.
    Exceeded(Admission),
}

impl RateLimitError {
    /// The limiter metadata of the denied request.
    pub fn admission(&self) -> &Admission {
        match self {
            RateLimitError::Exceeded(admission) => admission,
        }
    }
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::Exceeded(admission) => write!(
                f,
                "rate limit of {} exceeded, resets in {}s",
                admission.limit, admission.reset_seconds
            ),
        }
    }
}

impl std::error::Error for RateLimitError {}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        ApiError::rate_limited(err.admission().reset_seconds)
    }
}
