//! Rate Window Module
//!
//! Per-caller sliding window of request timestamps.

use std::collections::VecDeque;

use crate::limiter::RateLimitConfig;

// == Rate Window ==
/// Ordered request timestamps (Unix milliseconds), oldest at the front.
#[derive(Debug, Default, Clone)]
pub struct RateWindow {
    timestamps: VecDeque<u64>,
}

impl RateWindow {
    pub fn new() -> Self {
        Self::default()
    }

    // == Prune ==
    /// Drops timestamps that fell out of the trailing window.
    pub fn prune(&mut self, now_ms: u64, window_ms: u64) {
        while let Some(&oldest) = self.timestamps.front() {
            if now_ms.saturating_sub(oldest) >= window_ms {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    // == Try Admit ==
    /// Prunes, applies the interval and count checks, and records `now_ms`
    /// when admitted.
    pub fn try_admit(&mut self, now_ms: u64, config: &RateLimitConfig) -> bool {
        self.prune(now_ms, config.window_ms());

        if self.interval_wait_ms(now_ms, config) > 0 {
            return false;
        }
        if self.timestamps.len() >= config.max_requests {
            return false;
        }

        self.timestamps.push_back(now_ms);
        true
    }

    // == Wait Time ==
    /// Milliseconds until a request would be admitted; 0 if it would be now.
    pub fn wait_ms(&mut self, now_ms: u64, config: &RateLimitConfig) -> u64 {
        self.prune(now_ms, config.window_ms());
        self.window_wait_ms(now_ms, config)
            .max(self.interval_wait_ms(now_ms, config))
    }

    fn window_wait_ms(&self, now_ms: u64, config: &RateLimitConfig) -> u64 {
        if self.timestamps.len() < config.max_requests {
            return 0;
        }
        match self.timestamps.front() {
            Some(&oldest) => (oldest + config.window_ms()).saturating_sub(now_ms),
            None => 0,
        }
    }

    fn interval_wait_ms(&self, now_ms: u64, config: &RateLimitConfig) -> u64 {
        let min_interval = config.min_interval_ms();
        if min_interval == 0 {
            return 0;
        }
        match self.timestamps.back() {
            Some(&latest) => (latest + min_interval).saturating_sub(now_ms),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn latest(&self) -> Option<u64> {
        self.timestamps.back().copied()
    }
}
