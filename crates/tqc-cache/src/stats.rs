//! Cache statistics
//!
//! Counters are atomics so readers never contend with the store lock.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter set maintained by the store
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) evictions: AtomicU64,
    pub(crate) expired_removals: AtomicU64,
    pub(crate) rejected_admissions: AtomicU64,
    pub(crate) invalidated: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn snapshot(&self, size: usize, estimated_bytes: usize) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };

        CacheStats {
            size,
            estimated_bytes,
            hits,
            misses,
            hit_rate,
            miss_rate: if lookups == 0 { 0.0 } else { 1.0 - hit_rate },
            evictions: self.evictions.load(Ordering::Relaxed),
            expired_removals: self.expired_removals.load(Ordering::Relaxed),
            rejected_admissions: self.rejected_admissions.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Live entry count
    pub size: usize,
    /// Estimated memory footprint in bytes
    pub estimated_bytes: usize,
    /// Lookup hits
    pub hits: u64,
    /// Lookup misses (including lazy deletions)
    pub misses: u64,
    /// Hit rate over all lookups
    pub hit_rate: f64,
    /// Miss rate over all lookups
    pub miss_rate: f64,
    /// Entries removed by scored eviction
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expired_removals: u64,
    /// Offers refused by the admission policy
    pub rejected_admissions: u64,
    /// Entries removed by pattern invalidation
    pub invalidated: u64,
}
