//! Errors raised by upstream adapters.

use std::fmt;
use streamgate_core::ApiError;

/// A single failed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream answered with a non-success HTTP status.
    Status { status: u16, url: String },
    /// The request could not be sent or the response body not read.
    Transport(String),
    /// The request exceeded the client timeout.
    Timeout(String),
    /// The body was not the expected JSON shape.
    Decode(String),
    /// The JSON envelope reported a failure.
    Rejected { status: u16, message: String },
    /// No server offers the requested track type for an episode.
    NoServers {
        episode_id: String,
        track_type: String,
    },
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Client errors other than 408 and 429 are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } | Self::Rejected { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            Self::Transport(_) | Self::Timeout(_) | Self::NoServers { .. } => true,
            Self::Decode(_) => false,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, url } => write!(f, "upstream returned {} for {}", status, url),
            Self::Transport(e) => write!(f, "upstream request failed: {}", e),
            Self::Timeout(url) => write!(f, "upstream request timed out: {}", url),
            Self::Decode(e) => write!(f, "unexpected upstream response: {}", e),
            Self::Rejected { status, message } => {
                write!(f, "upstream rejected request ({}): {}", status, message)
            }
            Self::NoServers {
                episode_id,
                track_type,
            } => write!(f, "no {} servers available for {}", track_type, episode_id),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if err.is_timeout() {
            Self::Timeout(url)
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                url,
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::upstream_unavailable("upstream", 1, err)
    }
}
