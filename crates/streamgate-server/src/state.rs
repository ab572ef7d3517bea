//! Shared application state.

use crate::config::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Instant;
use streamgate_cache::TtlCache;
use streamgate_core::{ApiError, SweeperHandle};
use streamgate_ratelimiter::RateLimiter;
use streamgate_upstream::{
    HttpUpstream, ManifestPolicy, ResilientUpstream, StreamResolver, UpstreamSource,
};

/// User-Agent sent by the media proxy. Media hosts reject obvious bots.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// The production upstream: HTTP adapter wrapped in the retrier.
pub type DefaultUpstream = ResilientUpstream<HttpUpstream>;

/// State shared by every handler.
pub struct AppState<U> {
    pub config: Arc<AppConfig>,
    pub cache: TtlCache<ApiError>,
    pub limiter: RateLimiter,
    pub upstream: Arc<U>,
    pub resolver: StreamResolver<Arc<U>>,
    /// Client used by the media proxy, bounded by the stream timeout.
    pub proxy_client: reqwest::Client,
    pub policy: ManifestPolicy,
    pub started_at: Instant,
}

impl<U> AppState<U>
where
    U: UpstreamSource<Error = ApiError>,
{
    pub fn new(config: AppConfig, upstream: U) -> anyhow::Result<Self> {
        let upstream = Arc::new(upstream);
        let resolver = StreamResolver::with_default_candidates(Arc::clone(&upstream))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let proxy_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.stream_timeout())
            .build()?;

        Ok(Self {
            cache: TtlCache::new(config.cache_config()?),
            limiter: RateLimiter::new(config.rate_limiter_config()?),
            policy: config.manifest_policy(),
            config: Arc::new(config),
            upstream,
            resolver,
            proxy_client,
            started_at: Instant::now(),
        })
    }

    /// Starts the cache and limiter sweepers. Dropping the handles stops them.
    pub fn spawn_sweepers(&self) -> Vec<SweeperHandle> {
        vec![self.cache.spawn_sweeper(), self.limiter.spawn_sweeper()]
    }
}

impl AppState<DefaultUpstream> {
    /// State talking to the configured upstream API.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = HttpUpstream::new(&config.upstream_base_url, config.request_timeout())?;
        let upstream = ResilientUpstream::new(http, config.retry_config()?);
        Self::new(config, upstream)
    }
}

impl<U> std::fmt::Debug for AppState<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache)
            .field("limiter", &self.limiter)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
