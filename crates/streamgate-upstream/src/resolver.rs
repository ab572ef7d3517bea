//! Stream resolution across server candidates.

use crate::candidate::{default_candidates, ServerCandidate};
use crate::manifest::{is_absolute_http, proxy_url};
use crate::models::{EpisodeSources, Source, StreamData};
use crate::source::UpstreamSource;
use serde_json::json;
use std::fmt;
use streamgate_core::{ApiError, ConfigError};
use streamgate_fallback::{FallbackChain, FallbackError};

/// Why a single candidate could not be used.
#[derive(Debug)]
pub enum CandidateError<E> {
    /// An upstream call failed.
    Upstream(E),
    /// The episode has no server for the candidate's track type.
    NoServers,
}

impl<E: fmt::Display> fmt::Display for CandidateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateError::Upstream(e) => write!(f, "{}", e),
            CandidateError::NoServers => f.write_str("no servers available"),
        }
    }
}

/// Resolves a playable stream for an episode.
///
/// The preferred candidate is tried first, then every alternate of the
/// fallback chain that differs from it. A candidate is skipped when one of
/// its upstream calls fails or it yields no sources. The first candidate with
/// at least one source wins; its absolute source URLs are rewritten to the
/// proxy form.
pub struct StreamResolver<U> {
    upstream: U,
    chain: FallbackChain<ServerCandidate>,
}

impl<U: fmt::Debug> fmt::Debug for StreamResolver<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResolver")
            .field("upstream", &self.upstream)
            .field("chain", &self.chain)
            .finish()
    }
}

impl<U: UpstreamSource> StreamResolver<U> {
    pub fn new(upstream: U, chain: FallbackChain<ServerCandidate>) -> Self {
        Self { upstream, chain }
    }

    /// A resolver over the documented default candidate order.
    pub fn with_default_candidates(upstream: U) -> Result<Self, ConfigError> {
        let chain = FallbackChain::builder()
            .name("stream")
            .candidates(default_candidates())
            .build()?;
        Ok(Self::new(upstream, chain))
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn chain(&self) -> &FallbackChain<ServerCandidate> {
        &self.chain
    }

    /// Resolves `episode_id`, starting with `preferred`.
    ///
    /// Fails with `NoPlayableSource` once every candidate is exhausted; the
    /// error details list each candidate tried, in order.
    pub async fn resolve(
        &self,
        episode_id: &str,
        preferred: ServerCandidate,
    ) -> Result<StreamData, ApiError> {
        let outcome = self
            .chain
            .execute_with(
                preferred,
                |data: &StreamData| !data.sources.is_empty(),
                |candidate| self.try_candidate(episode_id, candidate),
            )
            .await;

        match outcome {
            Ok(resolved) => {
                let mut data = resolved.value;
                if resolved.used_fallback {
                    data.used_fallback = Some(resolved.candidate.name);
                }
                Ok(data)
            }
            Err(err) => Err(exhausted(episode_id, &err)),
        }
    }

    async fn try_candidate(
        &self,
        episode_id: &str,
        candidate: ServerCandidate,
    ) -> Result<StreamData, CandidateError<U::Error>> {
        let servers = self
            .upstream
            .episode_servers(episode_id)
            .await
            .map_err(CandidateError::Upstream)?;

        let available = servers.for_track(candidate.track_type);
        let selected = available
            .iter()
            .find(|s| s.server_name == candidate.name)
            .or_else(|| available.first())
            .ok_or(CandidateError::NoServers)?;

        let sources = self
            .upstream
            .episode_sources(episode_id, &selected.server_name, candidate.track_type)
            .await
            .map_err(CandidateError::Upstream)?;

        Ok(normalize(sources, selected.server_name.clone(), &candidate))
    }
}

/// Routes absolute source URLs through the proxy.
fn normalize(sources: EpisodeSources, server: String, candidate: &ServerCandidate) -> StreamData {
    StreamData {
        sources: sources
            .sources
            .into_iter()
            .map(|source| Source {
                url: if is_absolute_http(&source.url) {
                    proxy_url(&source.url)
                } else {
                    source.url
                },
                ..source
            })
            .collect(),
        headers: sources.headers,
        tracks: sources.tracks,
        intro: sources.intro,
        outro: sources.outro,
        server,
        track_type: candidate.track_type,
        used_fallback: None,
    }
}

fn exhausted(episode_id: &str, err: &FallbackError<ServerCandidate>) -> ApiError {
    let reasons: Vec<String> = err
        .attempts()
        .iter()
        .map(|a| format!("{}: {}", a.candidate, a.outcome))
        .collect();
    ApiError::no_playable_source(json!({
        "episodeId": episode_id,
        "tried": err.tried().collect::<Vec<_>>(),
        "reasons": reasons,
    }))
}
