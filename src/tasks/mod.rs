//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the layer is up.
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries from the response and prediction caches
//!   and idle caller windows from the rate limiter

mod cleanup;

pub use cleanup::spawn_cleanup_task;
