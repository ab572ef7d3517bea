//! Error types for the cache.

use std::fmt;
use streamgate_core::ApiError;

/// Errors that can occur in [`TtlCache`](crate::TtlCache) operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheError<E> {
    /// The compute function failed. Shared by every coalesced waiter.
    Compute(E),
    /// A value could not be serialized for storage or read back.
    Serialization(String),
}

impl<E> CacheError<E> {
    /// Returns the compute error, if that is what failed.
    pub fn into_compute(self) -> Option<E> {
        match self {
            CacheError::Compute(e) => Some(e),
            CacheError::Serialization(_) => None,
        }
    }

    pub(crate) fn serialization(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl<E: fmt::Display> fmt::Display for CacheError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Compute(e) => write!(f, "compute failed: {}", e),
            CacheError::Serialization(msg) => write!(f, "cache serialization failed: {}", msg),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CacheError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Compute(e) => Some(e),
            CacheError::Serialization(_) => None,
        }
    }
}

impl<E: Into<ApiError>> From<CacheError<E>> for ApiError {
    fn from(err: CacheError<E>) -> Self {
        match err {
            CacheError::Compute(e) => e.into(),
            CacheError::Serialization(msg) => {
                ApiError::internal(format!("cache serialization failed: {}", msg))
            }
        }
    }
}
