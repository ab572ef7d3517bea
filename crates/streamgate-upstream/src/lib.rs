//! The upstream side of streamgate.
//!
//! - [`UpstreamSource`]: the six fallible operations of the anime source,
//!   returning the normalized [`models`]
//! - [`HttpUpstream`]: an implementation over an aniwatch-compatible JSON API
//! - [`ResilientUpstream`]: wraps any source so every call is retried with
//!   exponential backoff and failures surface as [`ApiError`]s
//! - [`StreamResolver`]: resolves a playable stream by walking a
//!   [`FallbackChain`] of [`ServerCandidate`]s
//! - [`manifest`]: HLS playlist rewriting for the media proxy
//! - [`CacheKey`]: the flat `resource:param:...` cache key scheme
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use streamgate_retry::RetryConfig;
//! use streamgate_upstream::{
//!     HttpUpstream, ResilientUpstream, ServerCandidate, StreamResolver, TrackType, UpstreamError,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpUpstream::new("http://localhost:4000/api/v2/hianime", Duration::from_secs(10))?;
//! let retry = RetryConfig::builder()
//!     .name("upstream")
//!     .max_attempts(3)
//!     .base_delay(Duration::from_secs(1))
//!     .retry_on(UpstreamError::is_retryable)
//!     .build()?;
//! let resolver = StreamResolver::with_default_candidates(ResilientUpstream::new(http, retry))?;
//!
//! let stream = resolver
//!     .resolve("steinsgate-3?ep=213", ServerCandidate::new("hd-1", TrackType::Sub))
//!     .await?;
//! println!("{} sources via {}", stream.sources.len(), stream.server);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiError`]: streamgate_core::ApiError
//! [`FallbackChain`]: streamgate_fallback::FallbackChain

mod candidate;
mod error;
mod http;
mod keys;
pub mod manifest;
pub mod models;
mod resilient;
mod resolver;
mod source;

pub use candidate::{default_candidates, ServerCandidate, TrackType, UnknownTrackType, KNOWN_SERVERS};
pub use error::UpstreamError;
pub use http::{HttpUpstream, USER_AGENT};
pub use keys::{CacheKey, ResourceClass};
pub use manifest::{rewrite_manifest, ManifestPolicy};
pub use resilient::ResilientUpstream;
pub use resolver::{CandidateError, StreamResolver};
pub use source::UpstreamSource;
