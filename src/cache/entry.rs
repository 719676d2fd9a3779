//! Cache Entry Module
//!
//! Defines a single cached payload with its validator and expiry.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A cached payload tagged with an optional ETag and an absolute expiry.
///
/// Invariant: `expires_at >= stored_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Request identity this entry belongs to
    pub key: String,
    /// The cached bytes
    pub payload: Bytes,
    /// Validator used for conditional revalidation
    pub etag: Option<String>,
    /// When the payload was stored
    pub stored_at: DateTime<Utc>,
    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Builds an entry stored at `stored_at` that lives until `expires_at`.
    ///
    /// Callers are expected to have checked `expires_at >= stored_at`;
    /// the store derives `expires_at` from a non-negative TTL.
    pub fn new(
        key: String,
        payload: Bytes,
        etag: Option<String>,
        stored_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(expires_at >= stored_at);
        Self {
            key,
            payload,
            etag,
            stored_at,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks expiry against the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against `now`.
    ///
    /// The boundary is inclusive: once `now` reaches `expires_at` the entry
    /// is expired, so a zero TTL produces an entry that is never served.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime, clamped at zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expires_at - Utc::now();
        remaining.max(Duration::zero())
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
