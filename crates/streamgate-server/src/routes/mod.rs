//! API route handlers.
//!
//! - `health`: liveness probe
//! - `catalog`: search, anime details, episode lists, episode servers, home
//! - `stream`: stream resolution with server fallback
//! - `proxy`: media proxy with playlist rewriting
//!
//! Catalog and stream responses go through the shared TTL cache, keyed by
//! [`CacheKey`] and stored for the TTL of the key's resource class.

pub mod catalog;
pub mod health;
pub mod params;
pub mod proxy;
pub mod stream;

use crate::error::ServerResult;
use crate::state::AppState;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use streamgate_core::{ApiError, ApiResponse};
use streamgate_upstream::CacheKey;

/// Serves `key` from the cache, computing it on a miss.
pub(crate) async fn cached<U, T, F, Fut>(
    state: &AppState<U>,
    key: CacheKey<'_>,
    compute: F,
) -> ServerResult<Json<ApiResponse<T>>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let ttl = state.config.ttl_for(key.class());
    let data = state.cache.with_cache(&key.to_string(), ttl, compute).await?;
    Ok(Json(ApiResponse::ok(data)))
}
