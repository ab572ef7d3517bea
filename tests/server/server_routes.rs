use super::TestApp;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use streamgate_core::ApiError;
use streamgate_server::{build_router, AppConfig, AppState};
use streamgate_upstream::models::*;
use streamgate_upstream::{TrackType, UpstreamSource};
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_state() {
    let app = TestApp::default();
    let res = app.get("/health").await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["cacheEntries"], 0);
    assert!(body["data"]["timestamp"].as_u64().unwrap() > 0);
    assert!(body["error"].is_null());
    assert!(res.header("x-ratelimit-limit").is_none());
}

#[tokio::test]
async fn search_is_served_then_cached() {
    let app = TestApp::default();

    let first = app.get("/api/v1/search?q=frieren&page=2").await;
    assert_eq!(first.status, StatusCode::OK);
    let body = first.json();
    assert_eq!(body["data"]["animes"][0]["id"], "frieren");
    assert_eq!(body["data"]["pagination"]["currentPage"], 2);

    let second = app.get("/api/v1/search?q=frieren&page=2").await;
    assert_eq!(second.json(), body);
    assert_eq!(app.upstream().calls("search"), 1);

    // another page is another key
    app.get("/api/v1/search?q=frieren").await;
    assert_eq!(app.upstream().calls("search"), 2);
    assert_eq!(app.state.cache.len(), 2);
}

#[tokio::test]
async fn invalid_params_are_rejected_before_the_upstream() {
    let app = TestApp::default();
    let long = "x".repeat(101);
    let cases = [
        ("/api/v1/search".to_string(), "q is required"),
        ("/api/v1/search?q=".to_string(), "q is required"),
        (format!("/api/v1/search?q={}", long), "q must be at most 100 characters"),
        ("/api/v1/search?q=a&page=abc".to_string(), "page must be an integer"),
        ("/api/v1/search?q=a&page=0".to_string(), "page must be positive"),
        ("/api/v1/search?q=a&page=101".to_string(), "page too high"),
        ("/api/v1/servers".to_string(), "episodeId is required"),
        ("/api/v1/stream?episodeId=ep&type=subbed".to_string(), "type must be one of sub, dub, raw"),
        ("/api/v1/proxy".to_string(), "url is required"),
        ("/api/v1/proxy?url=ftp%3A%2F%2Fhost%2Fa".to_string(), "url must use http or https"),
        ("/api/v1/anime/%FF".to_string(), "id must be valid UTF-8"),
        ("/api/v1/episodes/%C3%28".to_string(), "id must be valid UTF-8"),
    ];

    for (uri, message) in cases {
        let res = app.get(&uri).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        let body = res.json();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["code"], "INVALID_PARAMS", "{}", uri);
        assert_eq!(body["error"]["message"], message, "{}", uri);
    }

    assert_eq!(app.upstream().calls("search"), 0);
    assert_eq!(app.upstream().calls("episode_servers"), 0);
    assert_eq!(app.upstream().calls("anime_info"), 0);
    assert_eq!(app.upstream().calls("episodes"), 0);
}

#[tokio::test]
async fn unknown_server_lists_choices() {
    let app = TestApp::default();
    let res = app.get("/api/v1/stream?episodeId=ep&server=nope").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let message = res.json()["error"]["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("server must be one of"), "{}", message);
    assert!(message.contains("hd-1"));
}

#[tokio::test]
async fn catalog_routes_return_envelopes() {
    let app = TestApp::default();

    let anime = app.get("/api/v1/anime/frieren").await.json();
    assert_eq!(anime["data"]["anime"]["name"], "FRIEREN");

    let episodes = app.get("/api/v1/episodes/frieren").await.json();
    assert_eq!(episodes["data"]["totalEpisodes"], 1);
    assert_eq!(episodes["data"]["episodes"][0]["episodeId"], "frieren?ep=1");

    let servers = app.get("/api/v1/servers?episodeId=frieren%3Fep%3D1").await.json();
    assert_eq!(servers["data"]["episodeId"], "frieren?ep=1");
    assert_eq!(servers["data"]["sub"][1]["serverName"], "hd-2");

    let home = app.get("/api/v1/home").await.json();
    assert_eq!(home["data"]["trendingAnimes"][0]["id"], "frieren");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway_and_not_cached() {
    let app = TestApp::default();

    for _ in 0..2 {
        let res = app.get("/api/v1/anime/broken").await;
        assert_eq!(res.status, StatusCode::BAD_GATEWAY);
        let body = res.json();
        assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
        assert_eq!(body["error"]["details"]["attempts"], 3);
    }
    assert_eq!(app.upstream().calls("anime_info"), 2);
    assert!(app.state.cache.is_empty());
}

#[tokio::test]
async fn stream_falls_back_and_proxies_sources() {
    let app = TestApp::default();

    let res = app.get("/api/v1/stream?episodeId=ep-1&server=hd-1&type=sub").await;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.json()["data"];
    assert_eq!(data["server"], "hd-2");
    assert_eq!(data["type"], "sub");
    assert_eq!(data["usedFallback"], "hd-2");
    assert_eq!(
        data["sources"][0]["url"],
        "/api/v1/proxy?url=https%3A%2F%2Fcdn.example%2Fmaster.m3u8"
    );
    assert_eq!(data["sources"][0]["isM3U8"], true);

    let sources_calls = app.upstream().calls("episode_sources");
    let again = app.get("/api/v1/stream?episodeId=ep-1&server=hd-1&type=sub").await;
    assert_eq!(again.json()["data"], *data);
    assert_eq!(app.upstream().calls("episode_sources"), sources_calls);
}

#[tokio::test]
async fn preferred_server_serves_without_fallback() {
    let app = TestApp::default();
    let res = app.get("/api/v1/stream?episodeId=ep-1&server=hd-2").await;
    let data = &res.json()["data"];
    assert_eq!(data["server"], "hd-2");
    assert!(data["usedFallback"].is_null());
}

#[tokio::test]
async fn exhausted_stream_is_not_found() {
    let app = TestApp::default();
    let res = app.get("/api/v1/stream?episodeId=gone").await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let body = res.json();
    assert_eq!(body["error"]["code"], "STREAM_NOT_FOUND");
    assert_eq!(body["error"]["details"]["episodeId"], "gone");
    assert_eq!(
        body["error"]["details"]["tried"][0],
        json!({ "name": "hd-1", "trackType": "sub" })
    );
    assert_eq!(body["error"]["details"]["tried"].as_array().unwrap().len(), 5);
    assert_eq!(app.upstream().calls("episode_servers"), 5);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = TestApp::default();
    assert_eq!(app.get("/api/v1/nope").await.status, StatusCode::NOT_FOUND);
}

/// An upstream whose every call panics, as on a malformed payload.
struct PanickingUpstream;

impl UpstreamSource for PanickingUpstream {
    type Error = ApiError;

    async fn search(&self, _query: &str, _page: u32) -> Result<SearchPage, ApiError> {
        panic!("unexpected upstream shape")
    }

    async fn anime_info(&self, _id: &str) -> Result<AnimeDetails, ApiError> {
        panic!("unexpected upstream shape")
    }

    async fn episodes(&self, _id: &str) -> Result<EpisodeList, ApiError> {
        panic!("unexpected upstream shape")
    }

    async fn episode_servers(&self, _episode_id: &str) -> Result<EpisodeServers, ApiError> {
        panic!("unexpected upstream shape")
    }

    async fn episode_sources(
        &self,
        _episode_id: &str,
        _server: &str,
        _track_type: TrackType,
    ) -> Result<EpisodeSources, ApiError> {
        panic!("unexpected upstream shape")
    }

    async fn home(&self) -> Result<HomePage, ApiError> {
        panic!("unexpected upstream shape")
    }
}

#[tokio::test]
async fn handler_panic_becomes_internal_error() {
    let state = Arc::new(AppState::new(AppConfig::default(), PanickingUpstream).unwrap());
    let router = build_router(Arc::clone(&state));

    for uri in ["/api/v1/home", "/api/v1/anime/frieren"] {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "internal server error");
    }

    // the router keeps serving after a panic
    let health = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
