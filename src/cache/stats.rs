//! Cache Statistics Module
//!
//! Snapshot of the store contents plus read counters.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of the cache.
///
/// `size` and `keys` may still include entries that have expired but were
/// not yet removed by a read or a sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Reads that returned a fresh value
    pub hits: u64,
    /// Reads that found nothing or an expired value
    pub misses: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
