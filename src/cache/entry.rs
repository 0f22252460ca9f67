//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use crate::clock::{current_timestamp_ms, secs_to_ms};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    created_at: u64,
    /// Lifetime in seconds, 0 = never expires
    ttl_seconds: u64,
    /// Number of successful lookups served by this entry
    hit_count: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Lifetime in seconds, 0 for no expiration
    pub fn new(value: V, ttl_seconds: u64) -> Self {
        Self::new_at(value, ttl_seconds, current_timestamp_ms())
    }

    /// Creates a new cache entry with an explicit creation time.
    pub fn new_at(value: V, ttl_seconds: u64, created_at: u64) -> Self {
        Self {
            value,
            created_at,
            ttl_seconds,
            hit_count: 0,
        }
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// Records a lookup served by this entry.
    pub fn record_hit(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// `created_at + ttl`. A TTL of 0 never expires.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at() {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    /// Expiration timestamp (Unix milliseconds), None = no expiration.
    pub fn expires_at(&self) -> Option<u64> {
        if self.ttl_seconds == 0 {
            None
        } else {
            Some(self.created_at.saturating_add(secs_to_ms(self.ttl_seconds)))
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at().map(|expires| expires.saturating_sub(now))
    }
}
