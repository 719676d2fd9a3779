//! Outcome of a conditional fetch performed outside the cache.
//!
//! The HTTP client sends `If-None-Match` with the etag from
//! [`CacheStore::conditional_etag`](super::CacheStore::conditional_etag) and
//! reports back what the origin said.

use bytes::Bytes;

// == Fetch Outcome ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Origin answered 200 with a new body
    Modified {
        payload: Bytes,
        etag: Option<String>,
    },
    /// Origin answered 304; the cached body is still valid
    NotModified,
}

impl FetchOutcome {
    /// Maps an HTTP status plus response parts to an outcome.
    ///
    /// Returns `None` for statuses that should not touch the cache.
    pub fn from_response(status: u16, etag: Option<String>, body: Bytes) -> Option<Self> {
        match status {
            304 => Some(FetchOutcome::NotModified),
            200 => Some(FetchOutcome::Modified {
                payload: body,
                etag,
            }),
            _ => None,
        }
    }
}
