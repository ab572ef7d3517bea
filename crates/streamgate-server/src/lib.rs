//! HTTP API for streamgate.
//!
//! Exposes anime search, details, episode lists, episode servers, home
//! listings and stream resolution from an unreliable upstream API, plus a
//! media proxy for HLS playlists and segments.
//!
//! Requests under `/api/v1` pass a per-client rate limiter before reaching a
//! handler. Catalog and stream responses are cached with a TTL per resource
//! class, and stream resolution falls back across servers when one fails.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use streamgate_server::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     streamgate_server::init_tracing(&config);
//!     streamgate_server::serve(config).await
//! }
//! ```
//!
//! # Endpoints
//!
//! - `GET /health` - liveness probe, never rate limited
//! - `GET /api/v1/search?q&page` - search
//! - `GET /api/v1/anime/{id}` - anime details
//! - `GET /api/v1/episodes/{id}` - episode list
//! - `GET /api/v1/servers?episodeId` - servers per track type
//! - `GET /api/v1/stream?episodeId&server&type` - playable stream
//! - `GET /api/v1/home` - home page listings
//! - `GET|OPTIONS /api/v1/proxy?url` - media proxy
//!
//! Every JSON response uses the `{success, data, error}` envelope.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AppConfig, LogFormat};
pub use error::{error_response, ServerError, ServerResult};
pub use middleware::{client_key, RateLimitLayer};
pub use server::{build_router, init_tracing, run, serve, shutdown_signal};
pub use state::{AppState, DefaultUpstream};
