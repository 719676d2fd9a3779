//! Shared Cache Module
//!
//! Thread-safe handle that spreads keys over independently locked stores.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::cache::store::Lookup;
use crate::cache::{CacheEntry, CacheStats, CacheStore, FetchOutcome, Validation};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Shared Cache ==
/// Cloneable handle to a sharded [`CacheStore`].
///
/// A key always lands on the same shard, so writes to one key are
/// serialized while keys on other shards are served concurrently.
/// Reads, validations and etag lookups only take a shard's read lock, so
/// they also run concurrently with each other within a shard.
#[derive(Debug, Clone)]
pub struct SharedCache {
    shards: Arc<[RwLock<CacheStore>]>,
}

impl SharedCache {
    // == Constructor ==
    /// Creates `shard_count` shards sharing `max_entries`.
    ///
    /// The shard count is clamped to `1..=max_entries` and each shard holds
    /// up to `ceil(max_entries / shard_count)` entries, so the total never
    /// exceeds `max_entries` by more than `shard_count - 1`.
    pub fn new(max_entries: usize, default_ttl: Duration, shard_count: usize) -> Self {
        let shard_count = shard_count.clamp(1, max_entries.max(1));
        let per_shard = max_entries.div_ceil(shard_count);
        let shards: Vec<_> = (0..shard_count)
            .map(|_| RwLock::new(CacheStore::new(per_shard, default_ttl)))
            .collect();

        Self {
            shards: shards.into(),
        }
    }

    /// Builds the cache described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_entries,
            config.default_ttl_duration(),
            config.shard_count,
        )
    }

    fn shard(&self, key: &str) -> &RwLock<CacheStore> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    pub async fn put(
        &self,
        key: String,
        payload: Bytes,
        etag: Option<String>,
        ttl: Option<Duration>,
    ) -> Result<DateTime<Utc>> {
        self.shard(&key).write().await.put(key, payload, etag, ttl)
    }

    /// Served under the read lock; the write lock is taken only to purge
    /// an entry found expired.
    pub async fn get(&self, key: &str) -> Result<CacheEntry> {
        let shard = self.shard(key);
        let lookup = shard.read().await.lookup(key);
        match lookup {
            Lookup::Hit(entry) => Ok(entry),
            Lookup::Expired => {
                shard.write().await.purge_if_expired(key);
                Err(CacheError::NotFound(key.to_string()))
            }
            Lookup::Miss => Err(CacheError::NotFound(key.to_string())),
        }
    }

    pub async fn validate(&self, key: &str, etag: &str) -> Validation {
        self.shard(key).read().await.validate(key, etag)
    }

    pub async fn conditional_etag(&self, key: &str) -> Option<String> {
        self.shard(key).read().await.conditional_etag(key)
    }

    pub async fn refresh(&self, key: &str, ttl: Option<Duration>) -> Result<DateTime<Utc>> {
        self.shard(key).write().await.refresh(key, ttl)
    }

    pub async fn apply_outcome(
        &self,
        key: &str,
        outcome: FetchOutcome,
        ttl: Option<Duration>,
    ) -> Result<DateTime<Utc>> {
        self.shard(key).write().await.apply_outcome(key, outcome, ttl)
    }

    pub async fn evict(&self, key: &str) -> Result<()> {
        self.shard(key).write().await.evict(key)
    }

    /// Empties every shard, returning the total removed.
    pub async fn clear(&self) -> usize {
        let mut removed = 0;
        for shard in self.shards.iter() {
            removed += shard.write().await.clear();
        }
        removed
    }

    /// Sweeps expired entries from every shard, one lock at a time.
    pub async fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for shard in self.shards.iter() {
            removed += shard.write().await.purge_expired();
        }
        removed
    }

    /// Counters summed over all shards.
    pub async fn stats(&self) -> CacheStats {
        let mut total = CacheStats::new();
        for shard in self.shards.iter() {
            total.merge(&shard.read().await.stats());
        }
        total
    }

    pub async fn len(&self) -> usize {
        let mut len = 0;
        for shard in self.shards.iter() {
            len += shard.read().await.len();
        }
        len
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> SharedCache {
        SharedCache::new(1000, Duration::seconds(300), 4)
    }

    #[test]
    fn test_shard_count_floor() {
        let cache = SharedCache::new(10, Duration::seconds(1), 0);
        assert_eq!(cache.shard_count(), 1);
    }

    #[test]
    fn test_shard_count_clamped_to_capacity() {
        let cache = SharedCache::new(5, Duration::seconds(300), 16);
        assert_eq!(cache.shard_count(), 5);
    }

    #[tokio::test]
    async fn test_small_capacity_is_not_inflated_by_shards() {
        let cache = SharedCache::new(5, Duration::seconds(300), 16);
        for i in 0..50 {
            cache
                .put(format!("key-{i}"), Bytes::new(), None, None)
                .await
                .unwrap();
            assert!(cache.len().await <= 5);
        }
    }

    /// Finds a second key hashed to the same shard as `key`.
    fn same_shard_key(cache: &SharedCache, key: &str) -> String {
        (0..10_000)
            .map(|i| format!("neighbour-{i}"))
            .find(|candidate| std::ptr::eq(cache.shard(candidate), cache.shard(key)))
            .expect("a neighbouring key within 10k candidates")
    }

    #[tokio::test]
    async fn test_reads_of_distinct_keys_on_one_shard_run_concurrently() {
        let cache = cache();
        let first = "https://example.com/a".to_string();
        let second = same_shard_key(&cache, &first);
        for key in [&first, &second] {
            cache
                .put(key.clone(), Bytes::from_static(b"v"), Some("\"e\"".into()), None)
                .await
                .unwrap();
        }

        // Held shared lock stands in for an in-flight read of `first`
        let _reader = cache.shard(&first).read().await;

        let got = tokio::time::timeout(std::time::Duration::from_millis(200), cache.get(&second))
            .await
            .expect("get of a distinct key must not wait for a concurrent read");
        assert_eq!(got.unwrap().payload, Bytes::from_static(b"v"));

        let validated = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            cache.validate(&second, "\"e\""),
        )
        .await
        .expect("validate of a distinct key must not wait for a concurrent read");
        assert_eq!(validated, Validation::Fresh);
    }

    #[tokio::test]
    async fn test_get_purges_expired_entry() {
        let cache = cache();
        cache
            .put("short".to_string(), Bytes::new(), None, Some(Duration::milliseconds(30)))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(matches!(cache.get("short").await, Err(CacheError::NotFound(_))));
        assert_eq!(cache.len().await, 0);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_key_maps_to_stable_shard() {
        let cache = cache();
        assert!(std::ptr::eq(
            cache.shard("https://example.com/a"),
            cache.shard("https://example.com/a"),
        ));
    }

    #[tokio::test]
    async fn test_put_get_validate_evict() {
        let cache = cache();
        cache
            .put(
                "k".to_string(),
                Bytes::from_static(b"body"),
                Some("\"e1\"".to_string()),
                None,
            )
            .await
            .unwrap();

        let entry = cache.get("k").await.unwrap();
        assert_eq!(entry.payload, Bytes::from_static(b"body"));
        assert_eq!(cache.validate("k", "\"e1\"").await, Validation::Fresh);
        assert_eq!(cache.validate("k", "\"e2\"").await, Validation::Stale);
        assert_eq!(cache.conditional_etag("k").await.as_deref(), Some("\"e1\""));

        cache.evict("k").await.unwrap();
        assert!(matches!(cache.get("k").await, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_and_stats_span_shards() {
        let cache = cache();
        for i in 0..20 {
            cache
                .put(format!("key-{i}"), Bytes::from(vec![i as u8]), None, None)
                .await
                .unwrap();
        }
        for i in 0..20 {
            cache.get(&format!("key-{i}")).await.unwrap();
        }
        let _ = cache.get("missing").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 20);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 20);
        assert_eq!(cache.len().await, 20);

        assert_eq!(cache.clear().await, 20);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired_across_shards() {
        let cache = cache();
        for i in 0..8 {
            cache
                .put(format!("short-{i}"), Bytes::new(), None, Some(Duration::milliseconds(30)))
                .await
                .unwrap();
        }
        cache
            .put("long".to_string(), Bytes::new(), None, None)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(cache.purge_expired().await, 8);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_one_entry_per_key() {
        let cache = cache();
        let mut handles = Vec::new();
        for writer in 0..16u8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .put(
                        "contended".to_string(),
                        Bytes::from(vec![writer]),
                        Some(format!("\"w{writer}\"")),
                        None,
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 1);
        let entry = cache.get("contended").await.unwrap();
        let writer = entry.payload[0];
        assert_eq!(entry.etag, Some(format!("\"w{writer}\"")));
    }

    #[tokio::test]
    async fn test_apply_not_modified_refreshes() {
        let cache = cache();
        cache
            .put("k".to_string(), Bytes::from_static(b"v"), None, Some(Duration::seconds(1)))
            .await
            .unwrap();

        let expires_at = cache
            .apply_outcome("k", FetchOutcome::NotModified, Some(Duration::seconds(120)))
            .await
            .unwrap();

        assert!(expires_at > Utc::now() + Duration::seconds(100));
    }
}
