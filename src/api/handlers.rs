//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, ETAG, EXPIRES, IF_NONE_MATCH},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{validation::if_none_match, CacheEntry, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, EvictResponse, HealthResponse, PutResponse, RefreshResponse, StatsResponse,
    TtlParams, ValidateParams, ValidateResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
}

impl AppState {
    /// Wraps an existing cache handle.
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(SharedCache::from_config(config))
    }
}

/// Handler for PUT /entries/:key
///
/// The request body is the payload, the `ETag` header its validator and
/// `?ttl=` the lifetime in seconds.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<TtlParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PutResponse>> {
    let ttl = params.ttl()?;
    let etag = header_str(&headers, ETAG)?;

    let expires_at = state.cache.put(key.clone(), body, etag, ttl).await?;
    debug!(key = %key, %expires_at, "stored entry");

    Ok(Json(PutResponse::new(key, expires_at)))
}

/// Handler for GET /entries/:key
///
/// Returns the raw payload, or `304 Not Modified` when `If-None-Match`
/// names the stored etag.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let entry = state.cache.get(&key).await?;
    let response_headers = entry_headers(&entry)?;

    if let Some(candidates) = header_str(&headers, IF_NONE_MATCH)? {
        if if_none_match(&candidates, entry.etag.as_deref()) {
            return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
        }
    }

    Ok((StatusCode::OK, response_headers, entry.payload).into_response())
}

/// Handler for GET /entries/:key/validate?etag=
pub async fn validate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<ValidateParams>,
) -> Json<ValidateResponse> {
    let status = state.cache.validate(&key, &params.etag).await;
    Json(ValidateResponse::new(key, params.etag, status))
}

/// Handler for POST /entries/:key/refresh?ttl=
///
/// Called after the origin answered `304 Not Modified`.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<TtlParams>,
) -> Result<Json<RefreshResponse>> {
    let ttl = params.ttl()?;
    let expires_at = state.cache.refresh(&key, ttl).await?;

    Ok(Json(RefreshResponse::new(key, expires_at)))
}

/// Handler for DELETE /entries/:key
pub async fn evict_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EvictResponse>> {
    state.cache.evict(&key).await?;

    Ok(Json(EvictResponse::new(key)))
}

/// Handler for DELETE /entries
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.clear().await;
    Json(ClearResponse { cleared })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Reads a header as text; non-visible-ASCII values are rejected.
fn header_str(headers: &HeaderMap, name: HeaderName) -> Result<Option<String>> {
    headers
        .get(&name)
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|_| CacheError::InvalidArgument(format!("Malformed {} header", name)))
        })
        .transpose()
}

/// `ETag`, `Expires` and `Cache-Control` headers describing an entry.
fn entry_headers(entry: &CacheEntry) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(etag) = &entry.etag {
        let value = HeaderValue::from_str(etag).map_err(|_| {
            CacheError::Internal(format!(
                "Stored etag for '{}' is not a valid header",
                entry.key
            ))
        })?;
        headers.insert(ETAG, value);
    }

    headers.insert(EXPIRES, header_value(http_date(entry.expires_at))?);
    let max_age = entry.ttl_remaining().num_seconds();
    headers.insert(CACHE_CONTROL, header_value(format!("max-age={}", max_age))?);

    Ok(headers)
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|e| CacheError::Internal(e.to_string()))
}

/// IMF-fixdate, as used by `Expires`.
fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
