//! Response DTOs for the cache HTTP surface
//!
//! Defines the JSON bodies returned by the non-payload endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, Validation};

/// Response body for `PUT /entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    pub message: String,
    pub key: String,
    /// When the stored entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl PutResponse {
    pub fn new(key: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
            expires_at,
        }
    }
}

/// Response body for `POST /entries/:key/refresh`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshResponse {
    pub fn new(key: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            expires_at,
        }
    }
}

/// Response body for `GET /entries/:key/validate`
#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub key: String,
    /// The etag that was checked
    pub etag: String,
    /// `"fresh"` or `"stale"`
    pub status: Validation,
}

impl ValidateResponse {
    pub fn new(key: impl Into<String>, etag: impl Into<String>, status: Validation) -> Self {
        Self {
            key: key.into(),
            etag: etag.into(),
            status,
        }
    }
}

/// Response body for `DELETE /entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    pub message: String,
    pub key: String,
}

impl EvictResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' evicted successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /entries`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of entries removed
    pub cleared: usize,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
