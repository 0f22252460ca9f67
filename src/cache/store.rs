//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::clock::current_timestamp_ms;

// == Cache Store ==
/// Single-threaded cache storage with LRU eviction and TTL support.
///
/// Wrap in [`SharedCache`](crate::cache::SharedCache) for concurrent use.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
    default_ttl: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL in seconds used when `set` is given `None`
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(max_entries),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// Overwrites reset the entry (value, creation time, TTL, hit count).
    /// A new key at capacity evicts the least recently used entry first.
    /// `ttl` of `Some(0)` never expires; `None` uses the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        self.set_at(key, value, ttl, current_timestamp_ms());
    }

    pub fn set_at(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>, now_ms: u64) {
        let key = key.into();
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                    debug!(key = %evicted_key, "evicted least recently used entry");
                }
                // Zero-capacity store keeps nothing.
                None => return,
            }
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        self.entries
            .insert(key.clone(), CacheEntry::new_at(value, effective_ttl, now_ms));
        self.lru.touch(&key);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed and counted as misses. Hits bump the
    /// entry's hit count and promote it to most recently used.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, current_timestamp_ms())
    }

    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_hit();
        let value = entry.value.clone();
        self.stats.record_hit();
        self.lru.touch(key);
        Some(value)
    }

    // == Contains ==
    /// Checks for a live entry without touching stats or recency.
    pub fn contains_key_at(&self, key: &str, now_ms: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now_ms))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.contains_key_at(key, current_timestamp_ms())
    }

    /// Hit count of a live entry, for diagnostics.
    pub fn hit_count(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(CacheEntry::hit_count)
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    /// Drops every entry. Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    pub fn cleanup_expired_at(&mut self, now_ms: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired_keys.len()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }
}
