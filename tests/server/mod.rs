//! Router tests.
//!
//! - server_routes.rs: envelopes, validation, caching, error mapping
//! - server_rate_limit.rs: admission headers and 429s
//! - server_proxy.rs: media proxy against a mock media host

mod server_routes;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use streamgate_core::ApiError;
use streamgate_server::{build_router, AppConfig, AppState};
use streamgate_upstream::models::*;
use streamgate_upstream::{TrackType, UpstreamSource};
use tower::ServiceExt;

/// An in-memory upstream that counts calls per operation.
///
/// - `search` and `home` always succeed
/// - `anime_info("broken")` and everything for episode `"gone"` fail
/// - episode servers offer `hd-1` and `hd-2` for sub; `hd-1` has no sources
#[derive(Default)]
pub(crate) struct FakeUpstream {
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeUpstream {
    fn record(&self, operation: &'static str) {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }
}

fn unavailable(operation: &str) -> ApiError {
    ApiError::upstream_unavailable(operation, 3, "connection refused")
}

fn summary(id: &str) -> AnimeSummary {
    AnimeSummary {
        id: id.to_string(),
        name: id.to_uppercase(),
        ..Default::default()
    }
}

impl UpstreamSource for FakeUpstream {
    type Error = ApiError;

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, ApiError> {
        self.record("search");
        Ok(SearchPage {
            animes: vec![summary(query)],
            pagination: Pagination {
                current_page: page,
                total_pages: 3,
                has_next_page: page < 3,
            },
        })
    }

    async fn anime_info(&self, id: &str) -> Result<AnimeDetails, ApiError> {
        self.record("anime_info");
        if id == "broken" {
            return Err(unavailable("anime_info(broken)"));
        }
        Ok(AnimeDetails {
            anime: AnimeInfo {
                id: id.to_string(),
                name: id.to_uppercase(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn episodes(&self, id: &str) -> Result<EpisodeList, ApiError> {
        self.record("episodes");
        Ok(EpisodeList {
            anime_id: id.to_string(),
            total_episodes: 1,
            episodes: vec![Episode {
                episode_id: format!("{}?ep=1", id),
                number: 1,
                title: Some("Pilot".to_string()),
                is_filler: false,
            }],
        })
    }

    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, ApiError> {
        self.record("episode_servers");
        if episode_id == "gone" {
            return Err(unavailable("episode_servers(gone)"));
        }
        let server = |name: &str| ServerInfo {
            server_name: name.to_string(),
            server_id: None,
        };
        Ok(EpisodeServers {
            episode_id: episode_id.to_string(),
            episode_no: Some(1),
            sub: vec![server("hd-1"), server("hd-2")],
            ..Default::default()
        })
    }

    async fn episode_sources(
        &self,
        _episode_id: &str,
        server: &str,
        _track_type: TrackType,
    ) -> Result<EpisodeSources, ApiError> {
        self.record("episode_sources");
        let sources = if server == "hd-2" {
            vec![Source {
                url: "https://cdn.example/master.m3u8".to_string(),
                quality: None,
                is_m3u8: true,
            }]
        } else {
            Vec::new()
        };
        Ok(EpisodeSources {
            sources,
            ..Default::default()
        })
    }

    async fn home(&self) -> Result<HomePage, ApiError> {
        self.record("home");
        Ok(HomePage {
            trending_animes: vec![summary("frieren")],
            ..Default::default()
        })
    }
}

pub(crate) struct TestApp {
    pub router: Router,
    pub state: Arc<AppState<FakeUpstream>>,
}

impl TestApp {
    pub(crate) fn new(config: AppConfig) -> Self {
        let state = Arc::new(AppState::new(config, FakeUpstream::default()).unwrap());
        Self {
            router: build_router(Arc::clone(&state)),
            state,
        }
    }

    pub(crate) fn upstream(&self) -> &FakeUpstream {
        &self.state.upstream
    }

    pub(crate) async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub(crate) async fn get_from(&self, uri: &str, client: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub(crate) async fn request(&self, method: Method, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
