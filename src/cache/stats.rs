//! Cache Statistics Module
//!
//! Counters for reads, validations, evictions and expirations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live entry
    pub hits: u64,
    /// Reads for absent or expired keys
    pub misses: u64,
    /// Entries dropped to make room under the capacity limit
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Validations answered `Fresh`
    pub fresh_validations: u64,
    /// Validations answered `Stale`
    pub stale_validations: u64,
    /// Current number of entries
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Adds another snapshot's counters into this one.
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.evictions += other.evictions;
        self.expirations += other.expirations;
        self.fresh_validations += other.fresh_validations;
        self.stale_validations += other.stale_validations;
        self.total_entries += other.total_entries;
    }
}

// == Stats Recorder ==
/// Live counters owned by a store.
///
/// Atomic so that validations, which only hold a shared borrow, can count.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    fresh_validations: AtomicU64,
    stale_validations: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_validation(&self, fresh: bool) {
        let counter = if fresh {
            &self.fresh_validations
        } else {
            &self.stale_validations
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters out, stamping the given entry count.
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            fresh_validations: self.fresh_validations.load(Ordering::Relaxed),
            stale_validations: self.stale_validations.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_miss();

        let stats = recorder.snapshot(3);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 3);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_validation_split() {
        let recorder = StatsRecorder::new();
        recorder.record_validation(true);
        recorder.record_validation(false);
        recorder.record_validation(false);

        let stats = recorder.snapshot(0);
        assert_eq!(stats.fresh_validations, 1);
        assert_eq!(stats.stale_validations, 2);
    }

    #[test]
    fn test_record_evictions_and_expirations() {
        let recorder = StatsRecorder::new();
        recorder.record_eviction();
        recorder.record_expirations(4);
        recorder.record_expirations(0);

        let stats = recorder.snapshot(0);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 4);
    }

    #[test]
    fn test_merge() {
        let mut total = CacheStats {
            hits: 1,
            misses: 2,
            total_entries: 3,
            ..CacheStats::default()
        };
        let shard = CacheStats {
            hits: 10,
            evictions: 1,
            fresh_validations: 5,
            total_entries: 4,
            ..CacheStats::default()
        };
        total.merge(&shard);

        assert_eq!(total.hits, 11);
        assert_eq!(total.misses, 2);
        assert_eq!(total.evictions, 1);
        assert_eq!(total.fresh_validations, 5);
        assert_eq!(total.total_entries, 7);
    }
}
