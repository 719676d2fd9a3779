//! Validator comparison for conditional revalidation.

use serde::Serialize;

// == Validation ==
/// Answer to "is my cached copy with this ETag still good?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Stored etag matches and the entry has not expired
    Fresh,
    /// Anything else: absent, expired, no stored etag, or a different etag
    Stale,
}

impl Validation {
    pub fn is_fresh(self) -> bool {
        self == Validation::Fresh
    }
}

/// Weak comparison of two entity tags.
///
/// A `W/` prefix is ignored on both sides, and a quoted tag equals its bare
/// opaque value, so `W/"v1"`, `"v1"` and `v1` all compare equal. Empty tags
/// never match.
pub fn etags_match(stored: &str, candidate: &str) -> bool {
    let stored = opaque_tag(stored);
    !stored.is_empty() && stored == opaque_tag(candidate)
}

/// Evaluates an `If-None-Match` header value against a stored etag.
///
/// Accepts a comma separated list; `*` matches whenever an etag is stored.
pub fn if_none_match(header: &str, stored: Option<&str>) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    header
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || etags_match(stored, candidate))
}

/// Normalizes a user supplied etag; blank tags are treated as absent.
pub fn normalize_etag(etag: Option<String>) -> Option<String> {
    etag.map(|tag| tag.trim().to_string())
        .filter(|tag| !opaque_tag(tag).is_empty())
}

fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    tag.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(tag)
}
