//! Rate Limiter Module
//!
//! Per-caller sliding-window admission control with optional minimum spacing.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::cache::ExpirySweep;
use crate::clock::{current_timestamp_ms, secs_to_ms};
use crate::limiter::RateWindow;

// == Rate Limit Config ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per caller within the window
    pub max_requests: usize,
    /// Sliding window length in seconds
    pub time_window_seconds: u64,
    /// Minimum spacing between two requests of one caller, 0 disables
    pub min_interval_seconds: u64,
}

impl RateLimitConfig {
    pub fn new(max_requests: usize, time_window_seconds: u64, min_interval_seconds: u64) -> Self {
        Self {
            max_requests,
            time_window_seconds,
            min_interval_seconds,
        }
    }

    pub fn window_ms(&self) -> u64 {
        secs_to_ms(self.time_window_seconds)
    }

    pub fn min_interval_ms(&self) -> u64 {
        secs_to_ms(self.min_interval_seconds)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(10, 60, 0)
    }
}

// == Limiter Stats ==
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LimiterStats {
    pub tracked_callers: usize,
    pub admitted: u64,
    pub rejected: u64,
}

// == Rate Limiter ==
/// Windows live in a sharded map; each check holds only its caller's shard
/// lock, so distinct callers rarely contend.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, RateWindow>,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // == Can Make Request ==
    /// Admits and records the request, or rejects it without recording.
    pub fn can_make_request(&self, caller_id: &str) -> bool {
        self.can_make_request_at(caller_id, current_timestamp_ms())
    }

    pub fn can_make_request_at(&self, caller_id: &str, now_ms: u64) -> bool {
        let admitted = self
            .windows
            .entry(caller_id.to_string())
            .or_default()
            .try_admit(now_ms, &self.config);

        if admitted {
            self.admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(caller = %caller_id, "rate limit rejected request");
        }
        admitted
    }

    // == Wait Time ==
    /// Seconds until the caller would be admitted; 0.0 if admitted now.
    pub fn wait_time(&self, caller_id: &str) -> f64 {
        self.wait_time_at(caller_id, current_timestamp_ms())
    }

    pub fn wait_time_at(&self, caller_id: &str, now_ms: u64) -> f64 {
        let wait_ms = self
            .windows
            .get_mut(caller_id)
            .map(|mut window| window.wait_ms(now_ms, &self.config))
            .unwrap_or(0);
        wait_ms as f64 / 1000.0
    }

    // == Reset ==
    /// Forgets the caller's history; returns whether any existed.
    pub fn reset(&self, caller_id: &str) -> bool {
        self.windows.remove(caller_id).is_some()
    }

    // == Cleanup ==
    /// Drops callers whose window has no timestamps left after pruning.
    pub fn cleanup_idle(&self) -> usize {
        self.cleanup_idle_at(current_timestamp_ms())
    }

    pub fn cleanup_idle_at(&self, now_ms: u64) -> usize {
        let window_ms = self.config.window_ms();
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now_ms, window_ms);
            !window.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            tracked_callers: self.windows.len(),
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl ExpirySweep for RateLimiter {
    fn cache_name(&self) -> &str {
        "rate_limits"
    }

    fn sweep_expired(&self) -> usize {
        self.cleanup_idle()
    }
}
