use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use streamgate_core::ApiResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// Unix time in milliseconds.
    pub timestamp: u64,
    pub uptime_seconds: u64,
    pub cache_entries: usize,
    pub tracked_clients: usize,
}

/// `GET /health`. Never rate limited and never touches the upstream.
pub async fn health_check<U>(State(state): State<Arc<AppState<U>>>) -> Json<ApiResponse<HealthStatus>>
where
    U: Send + Sync + 'static,
{
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    Json(ApiResponse::ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache_entries: state.cache.len(),
        tracked_clients: state.limiter.client_count(),
    }))
}
