//! Cache Statistics Module
//!
//! Combines process-local hit/miss counters with per-type storage figures
//! reported by the store adapter.

use serde::Serialize;

// == Per-Type Stats ==
/// Storage figures for one cache-type partition.
#[derive(Debug, Clone, Serialize)]
pub struct TypeStats {
    /// The cache type this partition holds
    pub cache_type: String,
    /// Number of live entries
    pub entries: u64,
    /// Approximate serialized size of the partition in bytes
    pub approx_bytes: u64,
}

// == Cache Stats ==
/// Aggregate cache statistics.
///
/// Hits and misses are counted in-process by the facade; entry counts and
/// sizes come from the store, so they reflect what every writer persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of cache hits observed by this process
    pub hits: u64,
    /// Number of cache misses observed by this process
    pub misses: u64,
    /// Per-type storage breakdown
    pub types: Vec<TypeStats>,
    /// Total live entries across the reported types
    pub total_entries: u64,
    /// Total approximate size across the reported types
    pub total_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds aggregate stats from counters and per-type figures.
    pub fn new(hits: u64, misses: u64, types: Vec<TypeStats>) -> Self {
        let total_entries = types.iter().map(|t| t.entries).sum();
        let total_bytes = types.iter().map(|t| t.approx_bytes).sum();
        Self {
            hits,
            misses,
            types,
            total_entries,
            total_bytes,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
