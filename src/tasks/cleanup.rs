//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries from every
//! cache owned by the application context.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ExpirySweep;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task loops forever, sleeping for `cleanup_interval_secs` between
/// sweeps. Each sweep takes each cache's lock only for that cache's pass.
///
/// # Returns
/// A JoinHandle that can be aborted during shutdown.
///
/// # Example
/// ```ignore
/// let responses: Arc<SharedCache<String>> = Arc::new(SharedCache::new("responses", 1000, 300));
/// let handle = spawn_cleanup_task(vec![responses.clone() as Arc<dyn ExpirySweep>], 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    caches: Vec<Arc<dyn ExpirySweep>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task for {} caches with interval of {} seconds",
            caches.len(),
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            for cache in &caches {
                let removed = cache.sweep_expired();
                if removed > 0 {
                    info!(cache = cache.cache_name(), "TTL cleanup: removed {} expired entries", removed);
                } else {
                    debug!(cache = cache.cache_name(), "TTL cleanup: no expired entries found");
                }
            }
        }
    })
}
