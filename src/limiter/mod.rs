//! Rate Limiter Module
//!
//! Sliding-window admission control keyed by caller identity.

mod sliding;
mod window;

#[cfg(test)]
mod property_tests;

pub use sliding::{LimiterStats, RateLimitConfig, RateLimiter};
pub use window::RateWindow;
