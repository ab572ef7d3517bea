//! Cache key scheme: `resource:param1:param2:...`.

use crate::candidate::TrackType;
use std::fmt;

/// The kind of resource a key names. Each kind has its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Search,
    Anime,
    Episodes,
    Servers,
    Stream,
    Home,
}

/// A cache key for one upstream resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey<'a> {
    Search { query: &'a str, page: u32 },
    Anime { id: &'a str },
    Episodes { id: &'a str },
    Servers { episode_id: &'a str },
    Stream {
        episode_id: &'a str,
        server: &'a str,
        track_type: TrackType,
    },
    Home,
}

impl CacheKey<'_> {
    pub fn class(&self) -> ResourceClass {
        match self {
            CacheKey::Search { .. } => ResourceClass::Search,
            CacheKey::Anime { .. } => ResourceClass::Anime,
            CacheKey::Episodes { .. } => ResourceClass::Episodes,
            CacheKey::Servers { .. } => ResourceClass::Servers,
            CacheKey::Stream { .. } => ResourceClass::Stream,
            CacheKey::Home => ResourceClass::Home,
        }
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Search { query, page } => write!(f, "search:{}:{}", query, page),
            CacheKey::Anime { id } => write!(f, "anime:{}", id),
            CacheKey::Episodes { id } => write!(f, "episodes:{}", id),
            CacheKey::Servers { episode_id } => write!(f, "servers:{}", episode_id),
            CacheKey::Stream {
                episode_id,
                server,
                track_type,
            } => write!(f, "stream:{}:{}:{}", episode_id, server, track_type),
            CacheKey::Home => f.write_str("home"),
        }
    }
}
