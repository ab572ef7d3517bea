use super::{details, resolver, servers, sources};
use serde_json::json;
use streamgate_core::ErrorKind;
use streamgate_upstream::{ServerCandidate, TrackType};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EPISODE: &str = "frieren-18542?ep=107257";

async fn mount_servers(server: &MockServer, sub: &[&str], dub: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/episode/servers"))
        .and(query_param("animeEpisodeId", EPISODE))
        .respond_with(ResponseTemplate::new(200).set_body_json(servers(sub, dub)))
        .mount(server)
        .await;
}

async fn mount_sources(server: &MockServer, name: &str, category: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/episode/sources"))
        .and(query_param("server", name))
        .and(query_param("category", category))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn preferred_server_serves_and_urls_are_proxied() {
    let server = MockServer::start().await;
    mount_servers(&server, &["hd-1", "hd-2"], &["hd-1"]).await;
    mount_sources(
        &server,
        "hd-1",
        "sub",
        ResponseTemplate::new(200).set_body_json(sources(&["https://cdn.example/hls/master.m3u8"])),
    )
    .await;

    let data = resolver(&server)
        .resolve(EPISODE, ServerCandidate::new("hd-1", TrackType::Sub))
        .await
        .unwrap();

    assert_eq!(data.server, "hd-1");
    assert_eq!(data.track_type, TrackType::Sub);
    assert_eq!(data.used_fallback, None);
    assert_eq!(data.sources.len(), 1);
    assert_eq!(
        data.sources[0].url,
        "/api/v1/proxy?url=https%3A%2F%2Fcdn.example%2Fhls%2Fmaster.m3u8"
    );
    assert!(data.sources[0].is_m3u8);
    assert_eq!(data.tracks[0].label.as_deref(), Some("English"));
    assert_eq!(data.intro.map(|s| s.end), Some(120.0));
    assert_eq!(
        data.headers.get("Referer").map(String::as_str),
        Some("https://megacloud.example/")
    );
}

#[tokio::test]
async fn empty_preferred_falls_back_to_next_server() {
    let server = MockServer::start().await;
    mount_servers(&server, &["hd-1", "hd-2"], &[]).await;
    mount_sources(
        &server,
        "hd-1",
        "sub",
        ResponseTemplate::new(200).set_body_json(sources(&[])),
    )
    .await;
    mount_sources(
        &server,
        "hd-2",
        "sub",
        ResponseTemplate::new(200).set_body_json(sources(&["https://cdn2.example/index.m3u8"])),
    )
    .await;

    let data = resolver(&server)
        .resolve(EPISODE, ServerCandidate::new("hd-1", TrackType::Sub))
        .await
        .unwrap();

    assert_eq!(data.server, "hd-2");
    assert_eq!(data.used_fallback.as_deref(), Some("hd-2"));
}

#[tokio::test]
async fn failing_preferred_is_retried_then_skipped() {
    let server = MockServer::start().await;
    mount_servers(&server, &["hd-1", "hd-2", "mega-cloud"], &[]).await;

    Mock::given(method("GET"))
        .and(path("/episode/sources"))
        .and(query_param("server", "hd-2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    mount_sources(
        &server,
        "mega-cloud",
        "sub",
        ResponseTemplate::new(200).set_body_json(sources(&["https://mc.example/a.m3u8"])),
    )
    .await;
    // hd-1 has no sources mock at all: 404 is not retried
    let data = resolver(&server)
        .resolve(EPISODE, ServerCandidate::new("hd-2", TrackType::Sub))
        .await
        .unwrap();

    assert_eq!(data.server, "mega-cloud");
    assert_eq!(data.used_fallback.as_deref(), Some("mega-cloud"));
    server.verify().await;
}

#[tokio::test]
async fn missing_track_type_skips_candidate() {
    let server = MockServer::start().await;
    mount_servers(&server, &["hd-1"], &[]).await;
    mount_sources(
        &server,
        "hd-1",
        "sub",
        ResponseTemplate::new(200).set_body_json(sources(&["https://cdn.example/sub.m3u8"])),
    )
    .await;

    let data = resolver(&server)
        .resolve(EPISODE, ServerCandidate::new("hd-1", TrackType::Dub))
        .await
        .unwrap();

    assert_eq!(data.track_type, TrackType::Sub);
    assert_eq!(data.used_fallback.as_deref(), Some("hd-1"));
}

#[tokio::test]
async fn every_candidate_failing_is_no_playable_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/episode/servers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = resolver(&server)
        .resolve(EPISODE, ServerCandidate::new("hd-1", TrackType::Sub))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NoPlayableSource);
    let details = details(&err);
    assert_eq!(details["episodeId"], EPISODE);
    assert_eq!(
        details["tried"],
        json!([
            { "name": "hd-1", "trackType": "sub" },
            { "name": "hd-2", "trackType": "sub" },
            { "name": "hd-1", "trackType": "dub" },
            { "name": "mega-cloud", "trackType": "sub" },
            { "name": "vidplay", "trackType": "sub" }
        ])
    );
    assert_eq!(details["reasons"].as_array().map(Vec::len), Some(5));

    // five candidates, three attempts each
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 15);
}
