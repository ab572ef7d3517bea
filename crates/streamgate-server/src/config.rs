//! Application configuration.
//!
//! Values come from an optional `streamgate.toml`, then from environment
//! variables (a `.env` file is loaded first if present). Variable names are
//! the upper-case field names: `PORT`, `RATE_LIMIT`, `CACHE_TTL_STREAM`, ...
//! Durations are milliseconds except cache TTLs, which are seconds.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use streamgate_cache::CacheConfig;
use streamgate_core::ConfigError;
use streamgate_ratelimiter::RateLimiterConfig;
use streamgate_retry::RetryConfig;
use streamgate_upstream::{ManifestPolicy, ResourceClass, UpstreamError};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Requests per client per window.
    pub rate_limit: u64,
    /// Window length in ms.
    pub rate_window: u64,
    /// Interval between limiter sweeps in ms.
    pub rate_sweep_interval: u64,

    // Cache TTLs, in seconds.
    pub cache_ttl_search: u64,
    pub cache_ttl_anime: u64,
    pub cache_ttl_episodes: u64,
    pub cache_ttl_servers: u64,
    pub cache_ttl_stream: u64,
    pub cache_ttl_home: u64,
    pub cache_max_entries: usize,
    /// Interval between cache sweeps in ms.
    pub cache_sweep_interval: u64,

    /// Per-upstream-call timeout in ms.
    pub request_timeout: u64,
    /// Media proxy fetch timeout in ms.
    pub stream_timeout: u64,
    pub retry_attempts: usize,
    /// Base retry delay in ms.
    pub retry_delay: u64,

    pub cors_origin: String,
    pub upstream_base_url: String,
    pub proxy_absolute_urls: bool,

    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            rate_limit: 60,
            rate_window: 60_000,
            rate_sweep_interval: 60_000,
            cache_ttl_search: 3600,
            cache_ttl_anime: 86_400,
            cache_ttl_episodes: 86_400,
            cache_ttl_servers: 3600,
            cache_ttl_stream: 1800,
            cache_ttl_home: 3600,
            cache_max_entries: 10_000,
            cache_sweep_interval: 60_000,
            request_timeout: 10_000,
            stream_timeout: 30_000,
            retry_attempts: 3,
            retry_delay: 1000,
            cors_origin: "*".to_string(),
            upstream_base_url: "http://localhost:4000/api/v2/hianime".to_string(),
            proxy_absolute_urls: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Loads `.env`, `streamgate.toml` and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();

        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("streamgate").required(false))
                .add_source(config::Environment::default().try_parsing(true)),
        )
    }

    /// Deserializes and validates configuration from arbitrary sources.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no component could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("rate_limit", self.rate_limit),
            ("rate_window", self.rate_window),
            ("rate_sweep_interval", self.rate_sweep_interval),
            ("cache_sweep_interval", self.cache_sweep_interval),
            ("request_timeout", self.request_timeout),
            ("stream_timeout", self.stream_timeout),
            ("retry_attempts", self.retry_attempts as u64),
            ("cache_max_entries", self.cache_max_entries as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::new(field, "must be greater than zero"));
            }
        }
        if url::Url::parse(&self.upstream_base_url).is_err() {
            return Err(ConfigError::new(
                "upstream_base_url",
                format!("`{}` is not an absolute URL", self.upstream_base_url),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_timeout)
    }

    /// Cache TTL for a resource class.
    pub fn ttl_for(&self, class: ResourceClass) -> Duration {
        let secs = match class {
            ResourceClass::Search => self.cache_ttl_search,
            ResourceClass::Anime => self.cache_ttl_anime,
            ResourceClass::Episodes => self.cache_ttl_episodes,
            ResourceClass::Servers => self.cache_ttl_servers,
            ResourceClass::Stream => self.cache_ttl_stream,
            ResourceClass::Home => self.cache_ttl_home,
        };
        Duration::from_secs(secs)
    }

    pub fn manifest_policy(&self) -> ManifestPolicy {
        ManifestPolicy::proxy_absolute(self.proxy_absolute_urls)
    }

    pub fn retry_config(&self) -> Result<RetryConfig<UpstreamError>, ConfigError> {
        RetryConfig::builder()
            .name("upstream")
            .max_attempts(self.retry_attempts)
            .base_delay(Duration::from_millis(self.retry_delay))
            .attempt_timeout(self.request_timeout())
            .retry_on(UpstreamError::is_retryable)
            .build()
    }

    pub fn rate_limiter_config(&self) -> Result<RateLimiterConfig, ConfigError> {
        RateLimiterConfig::builder()
            .name("api")
            .limit(self.rate_limit)
            .window(Duration::from_millis(self.rate_window))
            .sweep_interval(Duration::from_millis(self.rate_sweep_interval))
            .build()
    }

    pub fn cache_config(&self) -> Result<CacheConfig, ConfigError> {
        CacheConfig::builder()
            .name("responses")
            .max_entries(self.cache_max_entries)
            .default_ttl(Duration::from_secs(self.cache_ttl_search))
            .sweep_interval(Duration::from_millis(self.cache_sweep_interval))
            .build()
    }
}
