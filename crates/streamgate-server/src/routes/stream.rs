use super::cached;
use super::params::{candidate, required_text};
use crate::error::ServerResult;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use streamgate_core::{ApiError, ApiResponse};
use streamgate_upstream::models::StreamData;
use streamgate_upstream::{CacheKey, UpstreamSource};

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "episodeId")]
    pub episode_id: Option<String>,
    pub server: Option<String>,
    #[serde(rename = "type")]
    pub track_type: Option<String>,
}

/// `GET /api/v1/stream?episodeId&server&type`
///
/// Resolves through the fallback chain starting at the requested server.
/// The result is cached under the requested server, even when a fallback
/// served it; `usedFallback` tells the two apart.
pub async fn stream<U>(
    State(state): State<Arc<AppState<U>>>,
    Query(query): Query<StreamQuery>,
) -> ServerResult<Json<ApiResponse<StreamData>>>
where
    U: UpstreamSource<Error = ApiError> + 'static,
{
    let episode_id = required_text("episodeId", query.episode_id.as_deref())?;
    let preferred = candidate(query.server.as_deref(), query.track_type.as_deref())?;

    let key = CacheKey::Stream {
        episode_id: &episode_id,
        server: &preferred.name,
        track_type: preferred.track_type,
    };
    cached(&state, key, || {
        state.resolver.resolve(&episode_id, preferred.clone())
    })
    .await
}
