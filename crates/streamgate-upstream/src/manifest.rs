//! HLS manifest rewriting so media is fetched through the local proxy.
//!
//! Every relative reference in a playlist is resolved against the
//! playlist's own URL and rewritten to `/api/v1/proxy?url=<encoded>`.
//! Absolute references are left alone unless the policy says otherwise.
//! References already in proxy form are never touched, so rewriting is
//! idempotent.
//!
//! ```
//! use streamgate_upstream::manifest::{rewrite_manifest, ManifestPolicy};
//!
//! let playlist = "#EXTM3U\n#EXTINF:10,\nseg-1.ts\n";
//! let out = rewrite_manifest(playlist, "https://cdn.example/v/index.m3u8", &ManifestPolicy::default());
//! assert_eq!(
//!     out,
//!     "#EXTM3U\n#EXTINF:10,\n/api/v1/proxy?url=https%3A%2F%2Fcdn.example%2Fv%2Fseg-1.ts\n"
//! );
//! assert_eq!(rewrite_manifest(&out, "https://cdn.example/v/index.m3u8", &ManifestPolicy::default()), out);
//! ```

use url::Url;

/// Path of the proxy endpoint.
pub const PROXY_PATH: &str = "/api/v1/proxy";

/// Referer used when none can be derived from the target URL.
pub const DEFAULT_REFERER: &str = "https://hianime.to/";

/// Tags whose `URI="..."` attribute points at another resource.
const URI_TAGS: [&str; 4] = [
    "#EXT-X-KEY",
    "#EXT-X-MEDIA",
    "#EXT-X-MAP",
    "#EXT-X-I-FRAME-STREAM-INF",
];

/// How absolute references are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifestPolicy {
    /// Route absolute `http(s)` references through the proxy too.
    pub proxy_absolute: bool,
}

impl ManifestPolicy {
    pub fn proxy_absolute(proxy_absolute: bool) -> Self {
        Self { proxy_absolute }
    }
}

/// The proxy form of `url`.
pub fn proxy_url(url: &str) -> String {
    format!("{}?url={}", PROXY_PATH, urlencoding::encode(url))
}

/// Whether `reference` already points at the proxy.
pub fn is_proxied(reference: &str) -> bool {
    reference
        .strip_prefix(PROXY_PATH)
        .is_some_and(|rest| rest.starts_with("?url="))
}

/// Whether `reference` is an absolute `http` or `https` URL.
pub fn is_absolute_http(reference: &str) -> bool {
    Url::parse(reference).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// `scheme://host[:port]/` of `url`, or [`DEFAULT_REFERER`].
pub fn referer_for(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.origin().is_tuple() => {
            format!("{}/", parsed.origin().ascii_serialization())
        }
        _ => DEFAULT_REFERER.to_string(),
    }
}

/// Whether a response is an HLS playlist, judged by content type or path.
pub fn is_playlist(url: &str, content_type: Option<&str>) -> bool {
    let by_type = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("mpegurl"));
    let path = url.split(['?', '#']).next().unwrap_or(url);
    by_type || path.to_ascii_lowercase().ends_with(".m3u8")
}

/// Rewrites one media reference found in a playlist fetched from `base`.
///
/// Unparseable references are returned unchanged.
pub fn rewrite_reference(reference: &str, base: Option<&Url>, policy: &ManifestPolicy) -> String {
    if reference.is_empty() || is_proxied(reference) {
        return reference.to_string();
    }

    if let Ok(absolute) = Url::parse(reference) {
        let http = matches!(absolute.scheme(), "http" | "https");
        return if http && policy.proxy_absolute {
            proxy_url(reference)
        } else {
            reference.to_string()
        };
    }

    match base.map(|b| b.join(reference)) {
        Some(Ok(resolved)) => proxy_url(resolved.as_str()),
        _ => reference.to_string(),
    }
}

/// Rewrites every reference of `manifest`, fetched from `base_url`.
pub fn rewrite_manifest(manifest: &str, base_url: &str, policy: &ManifestPolicy) -> String {
    let base = Url::parse(base_url).ok();
    let mut out = String::with_capacity(manifest.len() + manifest.len() / 2);

    for (i, raw_line) in manifest.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let (line, cr) = match raw_line.strip_suffix('\r') {
            Some(line) => (line, "\r"),
            None => (raw_line, ""),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push_str(line);
        } else if trimmed.starts_with('#') {
            out.push_str(&rewrite_tag(line, base.as_ref(), policy));
        } else {
            out.push_str(&rewrite_reference(trimmed, base.as_ref(), policy));
        }
        out.push_str(cr);
    }

    out
}

fn rewrite_tag(line: &str, base: Option<&Url>, policy: &ManifestPolicy) -> String {
    if !URI_TAGS.iter().any(|tag| line.starts_with(tag)) {
        return line.to_string();
    }

    const ATTR: &str = "URI=\"";
    let Some(start) = line.find(ATTR).map(|i| i + ATTR.len()) else {
        return line.to_string();
    };
    let Some(len) = line[start..].find('"') else {
        return line.to_string();
    };

    let end = start + len;
    format!(
        "{}{}{}",
        &line[..start],
        rewrite_reference(&line[start..end], base, policy),
        &line[end..]
    )
}
