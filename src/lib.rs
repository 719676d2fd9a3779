//! ttl_etag_cache - An in-memory byte cache with TTL expiry and ETag revalidation
//!
//! Stores payloads keyed by request identity, each tagged with an optional
//! ETag and an expiry, and answers whether a client's copy is still fresh.
//! The cache is an explicit [`SharedCache`] handle passed to whoever needs it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEntry, CacheStore, FetchOutcome, SharedCache, Validation};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
