//! Stream server candidates and the default fallback order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audio/subtitle flavour of an episode stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    Sub,
    Dub,
    Raw,
}

impl TrackType {
    pub const ALL: [TrackType; 3] = [TrackType::Sub, TrackType::Dub, TrackType::Raw];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Sub => "sub",
            TrackType::Dub => "dub",
            TrackType::Raw => "raw",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown track type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrackType(pub String);

impl fmt::Display for UnknownTrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown track type `{}` (expected sub, dub or raw)", self.0)
    }
}

impl std::error::Error for UnknownTrackType {}

impl FromStr for TrackType {
    type Err = UnknownTrackType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sub" => Ok(TrackType::Sub),
            "dub" => Ok(TrackType::Dub),
            "raw" => Ok(TrackType::Raw),
            other => Err(UnknownTrackType(other.to_string())),
        }
    }
}

/// One named route to an episode's media, paired with a track type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCandidate {
    pub name: String,
    pub track_type: TrackType,
}

impl ServerCandidate {
    pub fn new(name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            name: name.into(),
            track_type,
        }
    }
}

impl fmt::Display for ServerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.track_type)
    }
}

/// Server names accepted from callers.
pub const KNOWN_SERVERS: [&str; 7] = [
    "hd-1",
    "hd-2",
    "hd-3",
    "hd-4",
    "hd-5",
    "mega-cloud",
    "vidplay",
];

/// The alternates tried, in order, after a caller's preferred candidate.
pub fn default_candidates() -> Vec<ServerCandidate> {
    vec![
        ServerCandidate::new("hd-1", TrackType::Sub),
        ServerCandidate::new("hd-2", TrackType::Sub),
        ServerCandidate::new("hd-1", TrackType::Dub),
        ServerCandidate::new("mega-cloud", TrackType::Sub),
        ServerCandidate::new("vidplay", TrackType::Sub),
    ]
}
