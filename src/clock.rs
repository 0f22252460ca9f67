//! Clock Module
//!
//! Millisecond wall-clock used by every time-aware component.

use chrono::Utc;

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Converts whole seconds to milliseconds.
pub fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(1000)
}
