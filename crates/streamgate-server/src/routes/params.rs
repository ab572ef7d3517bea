//! Query parameter validation.
//!
//! Parameters are extracted as optional strings and checked here, so a bad
//! value yields an `INVALID_PARAMS` envelope rather than axum's plain-text
//! rejection.

use crate::error::{ServerError, ServerResult};
use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use streamgate_upstream::{ServerCandidate, TrackType, KNOWN_SERVERS};

/// Longest accepted identifier or query.
pub const MAX_TEXT_LEN: usize = 100;
/// Highest accepted page number.
pub const MAX_PAGE: u32 = 100;
pub const DEFAULT_SERVER: &str = "hd-1";

/// A required text parameter of 1..=100 characters.
pub fn required_text(name: &str, value: Option<&str>) -> ServerResult<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ServerError::invalid_params(format!("{} is required", name)));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ServerError::invalid_params(format!(
            "{} must be at most {} characters",
            name, MAX_TEXT_LEN
        )));
    }
    Ok(value.to_string())
}

/// A required path segment, validated like [`required_text`].
///
/// A segment axum cannot decode (e.g. invalid UTF-8 after percent
/// decoding) is reported as an invalid parameter.
pub fn path_text(name: &str, segment: Result<Path<String>, PathRejection>) -> ServerResult<String> {
    match segment {
        Ok(Path(value)) => required_text(name, Some(&value)),
        Err(rejection) => {
            tracing::debug!(%rejection, "undecodable path segment");
            Err(ServerError::invalid_params(format!(
                "{} must be valid UTF-8",
                name
            )))
        }
    }
}

/// An optional page number in 1..=100, defaulting to 1.
pub fn page(value: Option<&str>) -> ServerResult<u32> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(1);
    };
    let page: i64 = raw
        .parse()
        .map_err(|_| ServerError::invalid_params("page must be an integer"))?;
    if page < 1 {
        return Err(ServerError::invalid_params("page must be positive"));
    }
    if page > MAX_PAGE as i64 {
        return Err(ServerError::invalid_params("page too high"));
    }
    Ok(page as u32)
}

/// The preferred stream candidate from `server` and `type`.
pub fn candidate(server: Option<&str>, track_type: Option<&str>) -> ServerResult<ServerCandidate> {
    let server = server
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SERVER);
    if !KNOWN_SERVERS.contains(&server) {
        return Err(ServerError::invalid_params(format!(
            "server must be one of {}",
            KNOWN_SERVERS.join(", ")
        )));
    }

    let track_type = match track_type.map(str::trim).filter(|v| !v.is_empty()) {
        None => TrackType::Sub,
        Some(raw) => raw
            .parse::<TrackType>()
            .map_err(|_| ServerError::invalid_params("type must be one of sub, dub, raw"))?,
    };

    Ok(ServerCandidate::new(server, track_type))
}

/// An absolute http(s) URL for the media proxy.
pub fn proxy_target(value: Option<&str>) -> ServerResult<url::Url> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServerError::invalid_params("url is required"))?;
    let url = url::Url::parse(raw)
        .map_err(|_| ServerError::invalid_params("url must be an absolute URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ServerError::invalid_params("url must use http or https")),
    }
}
