//! Request DTOs for the cache HTTP surface
//!
//! Query string parameters accepted by the entry endpoints.

use chrono::Duration;
use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Query for `PUT /entries/:key` and `POST /entries/:key/refresh`.
///
/// `ttl` is signed so a negative value reaches the store and is rejected
/// there, instead of failing query deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtlParams {
    /// TTL in seconds; the configured default applies when absent
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl TtlParams {
    /// Converts the TTL to a duration.
    ///
    /// # Errors
    /// `InvalidArgument` when the seconds do not fit a duration.
    pub fn ttl(&self) -> Result<Option<Duration>> {
        self.ttl
            .map(|secs| {
                Duration::try_seconds(secs).ok_or_else(|| {
                    CacheError::InvalidArgument(format!("TTL of {secs} seconds is out of range"))
                })
            })
            .transpose()
    }
}

/// Query for `GET /entries/:key/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateParams {
    /// The etag the client currently holds
    pub etag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_params_deserialize() {
        let params: TtlParams = serde_json::from_str(r#"{"ttl": 60}"#).unwrap();
        assert_eq!(params.ttl().unwrap(), Some(Duration::seconds(60)));

        let params: TtlParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.ttl().unwrap(), None);
    }

    #[test]
    fn test_negative_ttl_passes_through() {
        let params = TtlParams { ttl: Some(-10) };
        assert_eq!(params.ttl().unwrap(), Some(Duration::seconds(-10)));
    }

    #[test]
    fn test_out_of_range_ttl() {
        let params = TtlParams { ttl: Some(i64::MAX) };
        assert!(matches!(params.ttl(), Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_params_deserialize() {
        let params: ValidateParams = serde_json::from_str(r#"{"etag": "\"v1\""}"#).unwrap();
        assert_eq!(params.etag, "\"v1\"");
    }
}
