//! Mapping failures onto HTTP responses.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use streamgate_cache::CacheError;
use streamgate_core::{ApiError, ApiResponse, ErrorKind};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A categorized failure from a streamgate component.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The media proxy could not reach its target.
    #[error("proxy fetch failed: {0}")]
    Proxy(#[from] reqwest::Error),

    /// The media proxy target answered with an error status.
    #[error("proxy target returned {0}")]
    ProxyStatus(StatusCode),
}

/// HTTP status for a failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidParams => StatusCode::BAD_REQUEST,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::NoPlayableSource => StatusCode::NOT_FOUND,
        ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        ServerError::Api(ApiError::invalid_params(message))
    }

    /// The caller-facing form of this error.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            ServerError::Api(err) => err.clone(),
            ServerError::Proxy(err) if err.is_timeout() => {
                ApiError::upstream_unavailable("proxy", 1, "timed out")
            }
            ServerError::Proxy(err) => ApiError::upstream_unavailable("proxy", 1, err),
            ServerError::ProxyStatus(status) => {
                ApiError::upstream_unavailable("proxy", 1, status)
                    .with_details(json!({ "operation": "proxy", "upstreamStatus": status.as_u16() }))
            }
        }
    }
}

impl From<CacheError<ApiError>> for ServerError {
    fn from(err: CacheError<ApiError>) -> Self {
        ServerError::Api(err.into())
    }
}

/// Renders an [`ApiError`] as an envelope with the mapped status.
pub fn error_response(err: ApiError) -> Response {
    let status = status_for(err.kind);
    let retry_after = err.reset_seconds();

    let mut response = (status, Json(ApiResponse::<()>::err(err))).into_response();
    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let err = self.to_api_error();
        match err.kind {
            ErrorKind::InternalError | ErrorKind::UpstreamUnavailable => {
                tracing::warn!(code = %err.kind, message = %err.message, "request failed")
            }
            _ => tracing::debug!(code = %err.kind, message = %err.message, "request rejected"),
        }
        error_response(err)
    }
}
