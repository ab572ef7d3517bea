//! The upstream capability set.

use crate::candidate::TrackType;
use crate::models::{
    AnimeDetails, EpisodeList, EpisodeServers, EpisodeSources, HomePage, SearchPage,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// An unreliable source of anime metadata and media references.
///
/// Every operation is fallible and may be slow. Implementations return the
/// normalized models of [`crate::models`]; callers never see raw upstream
/// shapes.
///
/// # Examples
///
/// ```rust
/// use streamgate_upstream::models::*;
/// use streamgate_upstream::{TrackType, UpstreamSource};
///
/// struct Offline;
///
/// impl UpstreamSource for Offline {
///     type Error = String;
///
///     async fn search(&self, _query: &str, _page: u32) -> Result<SearchPage, String> {
///         Ok(SearchPage::default())
///     }
///     async fn anime_info(&self, id: &str) -> Result<AnimeDetails, String> {
///         Err(format!("{} is offline", id))
///     }
///     async fn episodes(&self, id: &str) -> Result<EpisodeList, String> {
///         Err(format!("{} is offline", id))
///     }
///     async fn episode_servers(&self, id: &str) -> Result<EpisodeServers, String> {
///         Err(format!("{} is offline", id))
///     }
///     async fn episode_sources(
///         &self,
///         id: &str,
///         _server: &str,
///         _track_type: TrackType,
///     ) -> Result<EpisodeSources, String> {
///         Err(format!("{} is offline", id))
///     }
///     async fn home(&self) -> Result<HomePage, String> {
///         Ok(HomePage::default())
///     }
/// }
/// ```
pub trait UpstreamSource: Send + Sync {
    type Error: fmt::Display + Send;

    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send;

    fn anime_info(&self, id: &str)
        -> impl Future<Output = Result<AnimeDetails, Self::Error>> + Send;

    fn episodes(&self, id: &str) -> impl Future<Output = Result<EpisodeList, Self::Error>> + Send;

    fn episode_servers(
        &self,
        episode_id: &str,
    ) -> impl Future<Output = Result<EpisodeServers, Self::Error>> + Send;

    fn episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        track_type: TrackType,
    ) -> impl Future<Output = Result<EpisodeSources, Self::Error>> + Send;

    fn home(&self) -> impl Future<Output = Result<HomePage, Self::Error>> + Send;
}

impl<U: UpstreamSource> UpstreamSource for Arc<U> {
    type Error = U::Error;

    fn search(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send {
        (**self).search(query, page)
    }

    fn anime_info(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<AnimeDetails, Self::Error>> + Send {
        (**self).anime_info(id)
    }

    fn episodes(&self, id: &str) -> impl Future<Output = Result<EpisodeList, Self::Error>> + Send {
        (**self).episodes(id)
    }

    fn episode_servers(
        &self,
        episode_id: &str,
    ) -> impl Future<Output = Result<EpisodeServers, Self::Error>> + Send {
        (**self).episode_servers(episode_id)
    }

    fn episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        track_type: TrackType,
    ) -> impl Future<Output = Result<EpisodeSources, Self::Error>> + Send {
        (**self).episode_sources(episode_id, server, track_type)
    }

    fn home(&self) -> impl Future<Output = Result<HomePage, Self::Error>> + Send {
        (**self).home()
    }
}
