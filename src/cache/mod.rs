//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, plus
//! deterministic key derivation for structured payloads.

mod entry;
mod key;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{hash_text, make_key, make_key_from};
pub use lru::LruTracker;
pub use shared::{ExpirySweep, KeyLookup, SharedCache};
pub use stats::CacheStats;
pub use store::CacheStore;
