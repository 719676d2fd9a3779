//! Cache Module
//!
//! In-memory byte cache with TTL expiry, ETag validation and LRU eviction.

mod entry;
mod lru;
mod revalidate;
mod shared;
mod stats;
mod store;
pub mod validation;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use revalidate::FetchOutcome;
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsRecorder};
pub use store::CacheStore;
pub use validation::Validation;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024; // 1 MB
