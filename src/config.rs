//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use chrono::Duration;

/// Upper bound applied to `DEFAULT_TTL` (roughly 100 years)
const MAX_DEFAULT_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Entry budget split across shards; the total stays below
    /// `max_entries + shard_count` (see `SharedCache::new`)
    pub max_entries: usize,
    /// Default TTL in seconds for entries stored without an explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Number of independently locked store shards, clamped to `max_entries`
    pub shard_count: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `SHARD_COUNT` - Store shards (default: 16)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            shard_count: env_or("SHARD_COUNT", defaults.shard_count),
        }
    }

    /// The default TTL as a duration, capped at roughly 100 years.
    pub fn default_ttl_duration(&self) -> Duration {
        Duration::seconds(self.default_ttl.min(MAX_DEFAULT_TTL_SECS) as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            server_port: 3000,
            cleanup_interval: 1,
            shard_count: 16,
        }
    }
}

/// Parses `name` from the environment, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
