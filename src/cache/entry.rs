//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A stored value together with the moment it was written and its TTL.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub data: V,
    /// Monotonic write time
    pub timestamp: Instant,
    /// How long the value stays fresh after `timestamp`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(data: V, ttl: Duration) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is still fresh;
    /// it expires only once the age strictly exceeds the TTL.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.timestamp) > self.ttl
    }

    /// Checks whether the entry is stale right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
