//! Stream resolution tests.
//!
//! - resolution.rs: fallback across servers through the HTTP adapter and retrier
//! - manifest.rs: playlist rewriting rules

mod manifest;
mod resolution;

use serde_json::{json, Value};
use std::time::Duration;
use streamgate_core::ApiError;
use streamgate_retry::RetryConfig;
use streamgate_upstream::{HttpUpstream, ResilientUpstream, StreamResolver, UpstreamError};
use wiremock::MockServer;

pub(crate) type Resolver = StreamResolver<ResilientUpstream<HttpUpstream>>;

/// A resolver over the mock server with fast retries.
pub(crate) fn resolver(server: &MockServer) -> Resolver {
    let http = HttpUpstream::new(server.uri(), Duration::from_secs(2)).unwrap();
    let retry = RetryConfig::builder()
        .name("upstream")
        .max_attempts(3)
        .base_delay(Duration::from_millis(5))
        .retry_on(UpstreamError::is_retryable)
        .build()
        .unwrap();
    StreamResolver::with_default_candidates(ResilientUpstream::new(http, retry)).unwrap()
}

pub(crate) fn envelope(data: Value) -> Value {
    json!({ "status": 200, "data": data })
}

pub(crate) fn servers(sub: &[&str], dub: &[&str]) -> Value {
    let list = |names: &[&str]| -> Vec<Value> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| json!({ "serverName": n, "serverId": i + 1 }))
            .collect()
    };
    envelope(json!({
        "episodeId": "frieren-18542?ep=107257",
        "episodeNo": 1,
        "sub": list(sub),
        "dub": list(dub),
        "raw": []
    }))
}

pub(crate) fn sources(urls: &[&str]) -> Value {
    let sources: Vec<Value> = urls
        .iter()
        .map(|u| json!({ "url": u, "type": "hls" }))
        .collect();
    envelope(json!({
        "headers": { "Referer": "https://megacloud.example/" },
        "sources": sources,
        "subtitles": [{ "url": "https://cdn.example/en.vtt", "lang": "English" }],
        "intro": { "start": 31, "end": 120 }
    }))
}

pub(crate) fn details(err: &ApiError) -> &Value {
    err.details.as_ref().expect("error details")
}
