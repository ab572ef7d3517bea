//! Retry-wrapped upstream.

use crate::candidate::TrackType;
use crate::models::{
    AnimeDetails, EpisodeList, EpisodeServers, EpisodeSources, HomePage, SearchPage,
};
use crate::source::UpstreamSource;
use std::fmt;
use streamgate_core::ApiError;
use streamgate_retry::{Retrier, RetryConfig};

/// Wraps every call of an [`UpstreamSource`] in a [`Retrier`].
///
/// Failures surface as [`ApiError`]s of kind `UpstreamUnavailable`, carrying
/// the operation name and attempt count.
pub struct ResilientUpstream<U: UpstreamSource> {
    inner: U,
    retrier: Retrier<U::Error>,
}

impl<U: UpstreamSource> ResilientUpstream<U> {
    pub fn new(inner: U, config: RetryConfig<U::Error>) -> Self {
        Self {
            inner,
            retrier: Retrier::new(config),
        }
    }

    pub fn inner(&self) -> &U {
        &self.inner
    }

    pub fn retrier(&self) -> &Retrier<U::Error> {
        &self.retrier
    }
}

impl<U> fmt::Debug for ResilientUpstream<U>
where
    U: UpstreamSource + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientUpstream")
            .field("inner", &self.inner)
            .field("retrier", &self.retrier)
            .finish()
    }
}

impl<U: UpstreamSource> UpstreamSource for ResilientUpstream<U> {
    type Error = ApiError;

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, ApiError> {
        let operation = format!("search({}, {})", query, page);
        self.retrier
            .run(&operation, || self.inner.search(query, page))
            .await
            .map_err(ApiError::from)
    }

    async fn anime_info(&self, id: &str) -> Result<AnimeDetails, ApiError> {
        let operation = format!("anime_info({})", id);
        self.retrier
            .run(&operation, || self.inner.anime_info(id))
            .await
            .map_err(ApiError::from)
    }

    async fn episodes(&self, id: &str) -> Result<EpisodeList, ApiError> {
        let operation = format!("episodes({})", id);
        self.retrier
            .run(&operation, || self.inner.episodes(id))
            .await
            .map_err(ApiError::from)
    }

    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, ApiError> {
        let operation = format!("episode_servers({})", episode_id);
        self.retrier
            .run(&operation, || self.inner.episode_servers(episode_id))
            .await
            .map_err(ApiError::from)
    }

    async fn episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        track_type: TrackType,
    ) -> Result<EpisodeSources, ApiError> {
        let operation = format!("episode_sources({}, {}, {})", episode_id, server, track_type);
        self.retrier
            .run(&operation, || {
                self.inner.episode_sources(episode_id, server, track_type)
            })
            .await
            .map_err(ApiError::from)
    }

    async fn home(&self) -> Result<HomePage, ApiError> {
        self.retrier
            .run("home()", || self.inner.home())
            .await
            .map_err(ApiError::from)
    }
}
