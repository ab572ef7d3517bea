//! Caller-facing failure taxonomy.
//!
//! Every streamgate operation terminates in either a value or an
//! [`ApiError`]. The error carries an [`ErrorKind`] (never a transport status:
//! mapping kinds onto HTTP codes is the boundary layer's job), a human
//! readable message and optional structured details.
//!
//! # Examples
//!
//! ```
//! use streamgate_core::{ApiError, ErrorKind};
//!
//! let err = ApiError::rate_limited(42);
//! assert_eq!(err.kind, ErrorKind::RateLimited);
//! assert_eq!(err.kind.code(), "RATE_LIMITED");
//! assert_eq!(err.details.unwrap()["resetSeconds"], 42);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// The category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Caller input failed validation. Never retried.
    InvalidParams,
    /// Admission denied by the rate limiter.
    RateLimited,
    /// Retries against the upstream source were exhausted.
    UpstreamUnavailable,
    /// Stream resolution exhausted every server candidate.
    #[serde(rename = "STREAM_NOT_FOUND")]
    NoPlayableSource,
    /// Anything uncategorized.
    InternalError,
}

impl ErrorKind {
    /// Returns the stable wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidParams => "INVALID_PARAMS",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::NoPlayableSource => "STREAM_NOT_FOUND",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A categorized failure returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Failure category, serialized as `code`.
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    /// Human readable description.
    pub message: String,
    /// Optional structured context (attempted candidates, reset time, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Caller input failed validation.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParams, message)
    }

    /// Admission denied; the caller should wait `reset_seconds`.
    pub fn rate_limited(reset_seconds: u64) -> Self {
        Self::new(
            ErrorKind::RateLimited,
            format!(
                "Rate limit exceeded. Try again in {} seconds.",
                reset_seconds
            ),
        )
        .with_details(json!({ "resetSeconds": reset_seconds }))
    }

    /// The upstream operation failed after `attempts` tries.
    pub fn upstream_unavailable(
        operation: &str,
        attempts: usize,
        last_error: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorKind::UpstreamUnavailable,
            format!(
                "{} failed after {} attempt(s): {}",
                operation, attempts, last_error
            ),
        )
        .with_details(json!({ "operation": operation, "attempts": attempts }))
    }

    /// No stream candidate yielded playable data.
    pub fn no_playable_source(details: Value) -> Self {
        Self::new(ErrorKind::NoPlayableSource, "No playable stream found").with_details(details)
    }

    /// Unexpected failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Returns the reset hint carried by a `RateLimited` error.
    pub fn reset_seconds(&self) -> Option<u64> {
        if self.kind != ErrorKind::RateLimited {
            return None;
        }
        self.details
            .as_ref()
            .and_then(|d| d.get("resetSeconds"))
            .and_then(Value::as_u64)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("serialization failed: {}", err))
    }
}

/// A component builder was given an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The offending setting.
    pub field: &'static str,
    /// Why it was rejected.
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}
