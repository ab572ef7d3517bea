//! Media proxy.
//!
//! Fetches a media resource with a browser User-Agent and a Referer derived
//! from the target's origin. Playlists are rewritten so their references
//! route back through this endpoint; everything else streams through
//! unchanged.

use super::params::proxy_target;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, RANGE, REFERER,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use streamgate_upstream::manifest::{is_playlist, referer_for};
use streamgate_upstream::rewrite_manifest;

pub const HLS_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Response headers copied from the proxied resource.
const PASSTHROUGH_HEADERS: [axum::http::HeaderName; 5] =
    [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES, CACHE_CONTROL];

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

fn add_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range, Content-Type, Accept"),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Length, Content-Range"),
    );
}

/// `GET /api/v1/proxy?url`
pub async fn proxy<U>(
    State(state): State<Arc<AppState<U>>>,
    headers: HeaderMap,
    Query(query): Query<ProxyQuery>,
) -> ServerResult<Response>
where
    U: Send + Sync + 'static,
{
    let target = proxy_target(query.url.as_deref())?;

    let mut request = state
        .proxy_client
        .get(target.as_str())
        .header(REFERER, referer_for(target.as_str()));
    if let Some(range) = headers.get(RANGE) {
        request = request.header(RANGE, range.clone());
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    if !status.is_success() {
        return Err(ServerError::ProxyStatus(status));
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = if is_playlist(target.as_str(), content_type.as_deref()) {
        // relative references resolve against the final URL, after redirects
        let base = upstream.url().to_string();
        let manifest = upstream.text().await?;
        tracing::debug!(url = %target, "rewriting playlist");
        (
            StatusCode::OK,
            [(CONTENT_TYPE, HLS_CONTENT_TYPE)],
            rewrite_manifest(&manifest, &base, &state.policy),
        )
            .into_response()
    } else {
        let mut passthrough = HeaderMap::new();
        for name in PASSTHROUGH_HEADERS {
            if let Some(value) = upstream.headers().get(&name) {
                passthrough.insert(name, value.clone());
            }
        }

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        response.headers_mut().extend(passthrough);
        response
    };

    add_cors(response.headers_mut());
    Ok(response)
}

/// `OPTIONS /api/v1/proxy`
pub async fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    add_cors(headers);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    response
}
