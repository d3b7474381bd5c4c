//! Cache Store Module
//!
//! TTL-keyed in-memory store. Entries are removed lazily on read, by an
//! explicit invalidate/clear, or by a sweep. There is no size bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::entry::CacheEntry;
use crate::cache::CacheStats;

/// Store shared between request handlers and the sweep task.
pub type SharedCache<V> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// In-memory key/value storage with per-entry TTL.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a new store for sharing across tasks.
    pub fn shared() -> SharedCache<V> {
        Arc::new(RwLock::new(Self::new()))
    }

    // == Get ==
    /// Returns the value for `key` if present and fresh.
    ///
    /// An expired entry is removed as a side effect and reported as `None`.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits += 1;
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.misses += 1;
        None
    }

    // == Set ==
    /// Inserts or overwrites the entry for `key`. Last writer wins.
    pub fn set(&mut self, key: impl Into<String>, data: V, ttl: Duration) {
        self.entries.insert(key.into(), CacheEntry::new(data, ttl));
    }

    // == Invalidate ==
    /// Removes the entry for `key` regardless of its TTL state.
    ///
    /// Returns whether an entry was present.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns a snapshot of the current entries and read counters.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();

        CacheStats {
            size: self.entries.len(),
            keys,
            hits: self.hits,
            misses: self.misses,
        }
    }

    // == Cleanup ==
    /// Removes every entry whose age exceeds its TTL at the moment of the call.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
