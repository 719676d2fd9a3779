//! Cache Store Module
//!
//! Owns the entries of one cache partition: storage, expiry, validator
//! comparison and LRU eviction under a capacity limit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::cache::validation::{etags_match, normalize_etag};
use crate::cache::{
    CacheEntry, CacheStats, FetchOutcome, LruTracker, StatsRecorder, Validation, MAX_KEY_LENGTH,
    MAX_PAYLOAD_SIZE,
};
use crate::error::{CacheError, Result};

// == Lookup ==
/// Result of a read that may not mutate the entry map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Hit(CacheEntry),
    /// Present but past its expiry; the caller purges under exclusive access
    Expired,
    Miss,
}

// == Cache Store ==
/// Byte cache keyed by request identity.
///
/// Reads take `&self`: recency lives behind its own mutex so a shard can
/// serve lookups of different keys under a shared lock.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: Mutex<LruTracker>,
    stats: StatsRecorder,
    max_entries: usize,
    /// TTL applied when `put` is called without one
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// A `max_entries` of zero is raised to one.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: Mutex::new(LruTracker::new()),
            stats: StatsRecorder::new(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`.
    ///
    /// The entry expires at `now + ttl` (`default_ttl` when `ttl` is `None`).
    /// Inserting a new key into a full store evicts the least recently used
    /// entry. Returns the computed expiry.
    ///
    /// # Errors
    /// `InvalidArgument` for a negative or out of range TTL, an empty or
    /// oversized key, or an oversized payload.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        payload: impl Into<Bytes>,
        etag: Option<String>,
        ttl: Option<Duration>,
    ) -> Result<DateTime<Utc>> {
        let key = key.into();
        let payload = payload.into();
        check_key(&key)?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CacheError::InvalidArgument(format!(
                "Payload exceeds maximum size of {} bytes",
                MAX_PAYLOAD_SIZE
            )));
        }

        let now = Utc::now();
        let expires_at = expiry_from(now, ttl.unwrap_or(self.default_ttl))?;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }

        let entry = CacheEntry::new(key.clone(), payload, normalize_etag(etag), now, expires_at);
        self.entries.insert(key.clone(), entry);
        self.lru_mut().touch(&key);

        Ok(expires_at)
    }

    // == Get ==
    /// Returns the live entry for `key`.
    ///
    /// An expired entry is removed on the spot and reported as `NotFound`.
    pub fn get(&mut self, key: &str) -> Result<CacheEntry> {
        match self.lookup(key) {
            Lookup::Hit(entry) => Ok(entry),
            Lookup::Expired => {
                self.purge_if_expired(key);
                Err(CacheError::NotFound(key.to_string()))
            }
            Lookup::Miss => Err(CacheError::NotFound(key.to_string())),
        }
    }

    /// Shared-borrow read: counts the hit or miss and marks a hit as
    /// recently used, but leaves expired entries in place.
    pub(crate) fn lookup(&self, key: &str) -> Lookup {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                self.lru().touch(key);
                Lookup::Hit(entry.clone())
            }
            Some(_) => {
                self.stats.record_miss();
                Lookup::Expired
            }
            None => {
                self.stats.record_miss();
                Lookup::Miss
            }
        }
    }

    /// Removes `key` if it is still expired, returning whether it was.
    ///
    /// Re-checks expiry, since a writer may have replaced the entry after
    /// a shared-lock lookup saw it expired.
    pub fn purge_if_expired(&mut self, key: &str) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired());
        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            debug!(key, "lazily purged expired entry");
        }
        expired
    }

    // == Validate ==
    /// Compares a client's etag with the stored one.
    ///
    /// `Fresh` only when an unexpired entry carries a matching etag.
    /// Does not affect recency and never fails.
    pub fn validate(&self, key: &str, etag: &str) -> Validation {
        let fresh = self
            .live_entry(key)
            .and_then(|entry| entry.etag.as_deref())
            .is_some_and(|stored| etags_match(stored, etag));

        self.stats.record_validation(fresh);
        if fresh {
            Validation::Fresh
        } else {
            Validation::Stale
        }
    }

    // == Conditional Etag ==
    /// Etag to send as `If-None-Match` when revalidating `key`, if any.
    pub fn conditional_etag(&self, key: &str) -> Option<String> {
        self.live_entry(key).and_then(|entry| entry.etag.clone())
    }

    // == Refresh ==
    /// Extends a live entry's expiry to `now + ttl`, keeping payload and etag.
    ///
    /// # Errors
    /// `NotFound` when absent or expired, `InvalidArgument` for a bad TTL.
    pub fn refresh(&mut self, key: &str, ttl: Option<Duration>) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = expiry_from(now, ttl.unwrap_or(self.default_ttl))?;

        let Some(entry) = self.entries.get_mut(key) else {
            return Err(CacheError::NotFound(key.to_string()));
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            return Err(CacheError::NotFound(key.to_string()));
        }

        entry.expires_at = expires_at;
        self.lru_mut().touch(key);
        Ok(expires_at)
    }

    // == Apply Outcome ==
    /// Folds a conditional fetch result into the store.
    ///
    /// `Modified` replaces the entry; `NotModified` refreshes its expiry.
    pub fn apply_outcome(
        &mut self,
        key: &str,
        outcome: FetchOutcome,
        ttl: Option<Duration>,
    ) -> Result<DateTime<Utc>> {
        match outcome {
            FetchOutcome::Modified { payload, etag } => self.put(key, payload, etag, ttl),
            FetchOutcome::NotModified => self.refresh(key, ttl),
        }
    }

    // == Evict ==
    /// Removes the entry for `key`.
    pub fn evict(&mut self, key: &str) -> Result<()> {
        if self.remove_entry(key).is_some() {
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Clear ==
    /// Removes every entry, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru_mut().clear();
        count
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn live_entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    fn lru(&self) -> MutexGuard<'_, LruTracker> {
        self.lru.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lru_mut(&mut self) -> &mut LruTracker {
        self.lru.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        self.lru_mut().remove(key);
        self.entries.remove(key)
    }

    fn evict_lru(&mut self) {
        if let Some(victim) = self.lru_mut().evict_oldest() {
            self.entries.remove(&victim);
            self.stats.record_eviction();
            debug!(key = %victim, "evicted least recently used entry");
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Key cannot be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// `now + ttl`, rejecting negative TTLs and timestamps chrono cannot hold.
fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    if ttl < Duration::zero() {
        return Err(CacheError::InvalidArgument(format!(
            "TTL must not be negative, got {}ms",
            ttl.num_milliseconds()
        )));
    }
    now.checked_add_signed(ttl)
        .ok_or_else(|| CacheError::InvalidArgument("TTL is out of range".to_string()))
}
