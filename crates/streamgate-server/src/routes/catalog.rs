//! Cached catalog lookups.

use super::cached;
use super::params::{page, path_text, required_text};
use crate::error::ServerResult;
use crate::state::AppState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use streamgate_core::{ApiError, ApiResponse};
use streamgate_upstream::models::{AnimeDetails, EpisodeList, EpisodeServers, HomePage, SearchPage};
use streamgate_upstream::{CacheKey, UpstreamSource};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EpisodeQuery {
    #[serde(rename = "episodeId")]
    pub episode_id: Option<String>,
}

/// `GET /api/v1/search?q&page`
pub async fn search<U>(
    State(state): State<Arc<AppState<U>>>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<Json<ApiResponse<SearchPage>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let q = required_text("q", query.q.as_deref())?;
    let page = page(query.page.as_deref())?;

    cached(&state, CacheKey::Search { query: &q, page }, || {
        state.upstream.search(&q, page)
    })
    .await
}

/// `GET /api/v1/anime/{id}`
pub async fn anime<U>(
    State(state): State<Arc<AppState<U>>>,
    id: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<ApiResponse<AnimeDetails>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let id = path_text("id", id)?;
    cached(&state, CacheKey::Anime { id: &id }, || state.upstream.anime_info(&id)).await
}

/// `GET /api/v1/episodes/{id}`
pub async fn episodes<U>(
    State(state): State<Arc<AppState<U>>>,
    id: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<ApiResponse<EpisodeList>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let id = path_text("id", id)?;
    cached(&state, CacheKey::Episodes { id: &id }, || state.upstream.episodes(&id)).await
}

/// `GET /api/v1/servers?episodeId`
pub async fn servers<U>(
    State(state): State<Arc<AppState<U>>>,
    Query(query): Query<EpisodeQuery>,
) -> ServerResult<Json<ApiResponse<EpisodeServers>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let episode_id = required_text("episodeId", query.episode_id.as_deref())?;
    cached(
        &state,
        CacheKey::Servers {
            episode_id: &episode_id,
        },
        || state.upstream.episode_servers(&episode_id),
    )
    .await
}

/// `GET /api/v1/home`
pub async fn home<U>(
    State(state): State<Arc<AppState<U>>>,
) -> ServerResult<Json<ApiResponse<HomePage>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    cached(&state, CacheKey::Home, || state.upstream.home()).await
}
