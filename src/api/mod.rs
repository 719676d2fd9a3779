//! API Module
//!
//! HTTP handlers and routing for the cache.
//!
//! # Endpoints
//! - `PUT /entries/:key` - Store a payload (`ETag` header, `?ttl=` seconds)
//! - `GET /entries/:key` - Fetch a payload, honouring `If-None-Match`
//! - `GET /entries/:key/validate` - Check an etag (`?etag=`)
//! - `POST /entries/:key/refresh` - Extend an entry's TTL after a 304
//! - `DELETE /entries/:key` - Evict one entry
//! - `DELETE /entries` - Clear the cache
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//!
//! Keys are a single path segment; percent-encode keys such as URLs.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
