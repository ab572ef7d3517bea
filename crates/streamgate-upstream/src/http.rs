//! [`UpstreamSource`] over an aniwatch-compatible JSON API.

use crate::candidate::TrackType;
use crate::error::UpstreamError;
use crate::models::*;
use crate::source::UpstreamSource;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

/// User agent sent to the upstream API.
pub const USER_AGENT: &str = concat!("streamgate/", env!("CARGO_PKG_VERSION"));

/// An HTTP client for an aniwatch-style API rooted at `base_url`
/// (e.g. `http://localhost:4000/api/v2/hianime`).
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    /// Creates a client whose every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Uses an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        #[cfg(feature = "tracing")]
        debug!(url = %response.url(), status = status.as_u16(), "upstream response");

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        let envelope: RawEnvelope<T> = serde_json::from_slice(&body)?;
        envelope.into_data()
    }
}

impl UpstreamSource for HttpUpstream {
    type Error = UpstreamError;

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage, UpstreamError> {
        let page = page.to_string();
        let raw: RawSearch = self
            .get("/search", &[("q", query), ("page", page.as_str())])
            .await?;
        Ok(raw.into())
    }

    async fn anime_info(&self, id: &str) -> Result<AnimeDetails, UpstreamError> {
        let path = format!("/anime/{}", urlencoding::encode(id));
        let raw: RawAnimeResponse = self.get(&path, &[]).await?;
        Ok(raw.into())
    }

    async fn episodes(&self, id: &str) -> Result<EpisodeList, UpstreamError> {
        let path = format!("/anime/{}/episodes", urlencoding::encode(id));
        let raw: RawEpisodes = self.get(&path, &[]).await?;
        Ok(EpisodeList {
            anime_id: id.to_string(),
            total_episodes: raw
                .total_episodes
                .unwrap_or(raw.episodes.len() as u32),
            episodes: raw.episodes.into_iter().map(Into::into).collect(),
        })
    }

    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, UpstreamError> {
        let raw: RawServers = self
            .get("/episode/servers", &[("animeEpisodeId", episode_id)])
            .await?;
        Ok(EpisodeServers {
            episode_id: raw.episode_id.unwrap_or_else(|| episode_id.to_string()),
            episode_no: raw.episode_no,
            sub: raw.sub.into_iter().map(Into::into).collect(),
            dub: raw.dub.into_iter().map(Into::into).collect(),
            raw: raw.raw.into_iter().map(Into::into).collect(),
        })
    }

    async fn episode_sources(
        &self,
        episode_id: &str,
        server: &str,
        track_type: TrackType,
    ) -> Result<EpisodeSources, UpstreamError> {
        let raw: RawSources = self
            .get(
                "/episode/sources",
                &[
                    ("animeEpisodeId", episode_id),
                    ("server", server),
                    ("category", track_type.as_str()),
                ],
            )
            .await?;
        Ok(raw.into())
    }

    async fn home(&self) -> Result<HomePage, UpstreamError> {
        let raw: RawHome = self.get("/home", &[]).await?;
        Ok(raw.into())
    }
}

// Raw upstream shapes. Every field is optional or defaulted so that a partial
// response still maps; only the envelope's `data` is required.

#[derive(Deserialize)]
struct RawEnvelope<T> {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> RawEnvelope<T> {
    fn into_data(self) -> Result<T, UpstreamError> {
        let status_ok = self.status.map_or(true, |s| (200..300).contains(&s));
        match self.data {
            Some(data) if status_ok && self.success != Some(false) => Ok(data),
            _ => Err(UpstreamError::Rejected {
                status: self.status.unwrap_or(502),
                message: self
                    .message
                    .unwrap_or_else(|| "response carried no data".to_string()),
            }),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawCounts {
    #[serde(default)]
    sub: Option<u32>,
    #[serde(default)]
    dub: Option<u32>,
}

impl From<RawCounts> for EpisodeCounts {
    fn from(raw: RawCounts) -> Self {
        EpisodeCounts {
            sub: raw.sub.unwrap_or(0),
            dub: raw.dub.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct RawAnime {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    episodes: Option<RawCounts>,
}

impl From<RawAnime> for AnimeSummary {
    fn from(raw: RawAnime) -> Self {
        AnimeSummary {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            poster: raw.poster,
            kind: raw.kind,
            episodes: raw.episodes.unwrap_or_default().into(),
        }
    }
}

fn summaries(raw: Vec<RawAnime>) -> Vec<AnimeSummary> {
    raw.into_iter().map(Into::into).collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearch {
    #[serde(default)]
    animes: Vec<RawAnime>,
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    has_next_page: bool,
}

impl From<RawSearch> for SearchPage {
    fn from(raw: RawSearch) -> Self {
        let current_page = raw.current_page.unwrap_or(1);
        SearchPage {
            animes: summaries(raw.animes),
            pagination: Pagination {
                current_page,
                total_pages: raw.total_pages.unwrap_or(current_page),
                has_next_page: raw.has_next_page,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnimeResponse {
    anime: RawAnimeDetail,
    #[serde(default)]
    related_animes: Vec<RawAnime>,
    #[serde(default)]
    recommended_animes: Vec<RawAnime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnimeDetail {
    info: RawInfo,
    #[serde(default)]
    more_info: RawMoreInfo,
}

#[derive(Deserialize)]
struct RawInfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stats: Option<RawStats>,
}

#[derive(Deserialize)]
struct RawStats {
    #[serde(default)]
    episodes: Option<RawCounts>,
}

#[derive(Deserialize, Default)]
struct RawMoreInfo {
    #[serde(default)]
    japanese: Option<String>,
    #[serde(default)]
    aired: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
}

impl From<RawAnimeResponse> for AnimeDetails {
    fn from(raw: RawAnimeResponse) -> Self {
        let RawAnimeDetail { info, more_info } = raw.anime;
        AnimeDetails {
            anime: AnimeInfo {
                name: info.name.unwrap_or_else(|| info.id.clone()),
                id: info.id,
                japanese_name: more_info.japanese,
                poster: info.poster,
                description: info.description,
                genres: more_info.genres,
                status: more_info.status,
                release_date: more_info.aired,
                episodes: info
                    .stats
                    .and_then(|s| s.episodes)
                    .unwrap_or_default()
                    .into(),
            },
            related: summaries(raw.related_animes),
            recommended: summaries(raw.recommended_animes),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEpisodes {
    #[serde(default)]
    total_episodes: Option<u32>,
    #[serde(default)]
    episodes: Vec<RawEpisode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEpisode {
    episode_id: String,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    is_filler: bool,
}

impl From<RawEpisode> for Episode {
    fn from(raw: RawEpisode) -> Self {
        Episode {
            episode_id: raw.episode_id,
            number: raw.number,
            title: raw.title,
            is_filler: raw.is_filler,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServers {
    #[serde(default)]
    episode_id: Option<String>,
    #[serde(default)]
    episode_no: Option<u32>,
    #[serde(default)]
    sub: Vec<RawServer>,
    #[serde(default)]
    dub: Vec<RawServer>,
    #[serde(default)]
    raw: Vec<RawServer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServer {
    server_name: String,
    #[serde(default)]
    server_id: Option<u32>,
}

impl From<RawServer> for ServerInfo {
    fn from(raw: RawServer) -> Self {
        ServerInfo {
            server_name: raw.server_name,
            server_id: raw.server_id,
        }
    }
}

#[derive(Deserialize)]
struct RawSources {
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    sources: Vec<RawSource>,
    #[serde(default, alias = "subtitles")]
    tracks: Vec<RawTrack>,
    #[serde(default)]
    intro: Option<Segment>,
    #[serde(default)]
    outro: Option<Segment>,
}

#[derive(Deserialize)]
struct RawSource {
    url: String,
    #[serde(default, alias = "type")]
    quality: Option<String>,
    #[serde(default, rename = "isM3U8")]
    is_m3u8: Option<bool>,
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(alias = "url")]
    file: String,
    #[serde(default, alias = "lang")]
    label: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    default: bool,
}

impl From<RawSources> for EpisodeSources {
    fn from(raw: RawSources) -> Self {
        EpisodeSources {
            sources: raw
                .sources
                .into_iter()
                .map(|s| Source {
                    is_m3u8: s.is_m3u8.unwrap_or_else(|| looks_like_playlist(&s.url)),
                    url: s.url,
                    quality: s.quality,
                })
                .collect(),
            headers: raw.headers,
            tracks: raw
                .tracks
                .into_iter()
                .map(|t| Track {
                    file: t.file,
                    label: t.label,
                    kind: t.kind,
                    default: t.default,
                })
                .collect(),
            intro: raw.intro,
            outro: raw.outro,
        }
    }
}

fn looks_like_playlist(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".m3u8")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHome {
    #[serde(default)]
    spotlight_animes: Vec<RawAnime>,
    #[serde(default)]
    trending_animes: Vec<RawAnime>,
    #[serde(default)]
    latest_episode_animes: Vec<RawAnime>,
    #[serde(default)]
    top_upcoming_animes: Vec<RawAnime>,
    #[serde(default)]
    top_airing_animes: Vec<RawAnime>,
    #[serde(default)]
    most_popular_animes: Vec<RawAnime>,
    #[serde(default)]
    genres: Vec<String>,
}

impl From<RawHome> for HomePage {
    fn from(raw: RawHome) -> Self {
        HomePage {
            spotlight_animes: summaries(raw.spotlight_animes),
            trending_animes: summaries(raw.trending_animes),
            latest_episode_animes: summaries(raw.latest_episode_animes),
            top_upcoming_animes: summaries(raw.top_upcoming_animes),
            top_airing_animes: summaries(raw.top_airing_animes),
            most_popular_animes: summaries(raw.most_popular_animes),
            genres: raw.genres,
        }
    }
}
