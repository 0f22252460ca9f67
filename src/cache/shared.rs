//! Shared Cache Module
//!
//! Thread-safe named cache instance built on a single coarse lock.

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};

// == Key Lookup ==
/// Read-only presence check, for components that only need to know whether
/// an answer is already cached.
pub trait KeyLookup: Send + Sync {
    fn contains_key(&self, key: &str) -> bool;
}

impl<V: Clone + Send> KeyLookup for SharedCache<V> {
    fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }
}

// == Expiry Sweep ==
/// Type-erased handle used by the maintenance task to sweep any cache.
pub trait ExpirySweep: Send + Sync {
    fn cache_name(&self) -> &str;
    fn sweep_expired(&self) -> usize;
}

impl<V: Clone + Send> ExpirySweep for SharedCache<V> {
    fn cache_name(&self) -> &str {
        &self.name
    }

    fn sweep_expired(&self) -> usize {
        self.cleanup_expired()
    }
}

// == Shared Cache ==
/// A named [`CacheStore`] behind one mutex.
///
/// Every operation, including the promotion done by `get`, runs under the
/// lock, so recency order and the size bound stay consistent across threads.
#[derive(Debug)]
pub struct SharedCache<V> {
    name: String,
    store: Mutex<CacheStore<V>>,
}

impl<V: Clone> SharedCache<V> {
    pub fn new(name: impl Into<String>, max_entries: usize, default_ttl: u64) -> Self {
        Self {
            name: name.into(),
            store: Mutex::new(CacheStore::new(max_entries, default_ttl)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        self.store.lock().set(key, value, ttl);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear();
        debug!(cache = %self.name, "cache cleared");
    }

    pub fn cleanup_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}
