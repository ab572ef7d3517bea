//! Normalized upstream results.
//!
//! These are the only shapes callers see. Every upstream adapter maps its raw
//! responses into them field by field.

use crate::candidate::TrackType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Episode counts per track type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeCounts {
    pub sub: u32,
    pub dub: u32,
}

/// A title as it appears in listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeSummary {
    pub id: String,
    pub name: String,
    pub poster: Option<String>,
    /// TV, Movie, OVA, ...
    pub kind: Option<String>,
    pub episodes: EpisodeCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub animes: Vec<AnimeSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeInfo {
    pub id: String,
    pub name: String,
    pub japanese_name: Option<String>,
    pub poster: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub release_date: Option<String>,
    pub episodes: EpisodeCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub anime: AnimeInfo,
    pub related: Vec<AnimeSummary>,
    pub recommended: Vec<AnimeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode_id: String,
    pub number: u32,
    pub title: Option<String>,
    pub is_filler: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeList {
    pub anime_id: String,
    pub total_episodes: u32,
    pub episodes: Vec<Episode>,
}

/// A server offering an episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub server_name: String,
    pub server_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeServers {
    pub episode_id: String,
    pub episode_no: Option<u32>,
    pub sub: Vec<ServerInfo>,
    pub dub: Vec<ServerInfo>,
    pub raw: Vec<ServerInfo>,
}

impl EpisodeServers {
    /// Servers offering `track_type`.
    pub fn for_track(&self, track_type: TrackType) -> &[ServerInfo] {
        match track_type {
            TrackType::Sub => &self.sub,
            TrackType::Dub => &self.dub,
            TrackType::Raw => &self.raw,
        }
    }
}

/// A playable media reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub url: String,
    pub quality: Option<String>,
    #[serde(rename = "isM3U8")]
    pub is_m3u8: bool,
}

/// A subtitle or thumbnail track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub file: String,
    pub label: Option<String>,
    pub kind: Option<String>,
    #[serde(default)]
    pub default: bool,
}

/// Intro/outro skip markers, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSources {
    pub sources: Vec<Source>,
    pub headers: BTreeMap<String, String>,
    pub tracks: Vec<Track>,
    pub intro: Option<Segment>,
    pub outro: Option<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub spotlight_animes: Vec<AnimeSummary>,
    pub trending_animes: Vec<AnimeSummary>,
    pub latest_episode_animes: Vec<AnimeSummary>,
    pub top_upcoming_animes: Vec<AnimeSummary>,
    pub top_airing_animes: Vec<AnimeSummary>,
    pub most_popular_animes: Vec<AnimeSummary>,
    pub genres: Vec<String>,
}

/// A resolved, playable stream for an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamData {
    pub sources: Vec<Source>,
    pub headers: BTreeMap<String, String>,
    pub tracks: Vec<Track>,
    pub intro: Option<Segment>,
    pub outro: Option<Segment>,
    /// Server that served the stream.
    pub server: String,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    /// Name of the alternate server used when the preferred one failed.
    pub used_fallback: Option<String>,
}
