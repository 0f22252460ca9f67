//! Application Context
//!
//! Owns every governance component for the life of the process, with an
//! explicit startup (`from_config`, `spawn_maintenance`) and `shutdown`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{make_key_from, ExpirySweep, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::guard::InputGuard;
use crate::limiter::{RateLimitConfig, RateLimiter};
use crate::rotator::CredentialManager;
use crate::router::{QueryRouter, RoutingMode};
use crate::tasks::spawn_cleanup_task;

/// Namespace of prediction cache keys
pub const PREDICTION_KEY_NAMESPACE: &str = "prediction";

// == Cached Reply ==
/// Payload stored in the response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedReply {
    pub text: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub mode: RoutingMode,
}

// == App Context ==
/// Shared application state. Cloning is cheap; all clones see the same components.
#[derive(Clone)]
pub struct AppContext {
    pub guard: Arc<InputGuard>,
    pub responses: Arc<SharedCache<CachedReply>>,
    pub predictions: Arc<SharedCache<Value>>,
    pub limiter: Arc<RateLimiter>,
    pub credentials: Arc<CredentialManager>,
    pub router: Arc<QueryRouter>,
    quota_retry_after: u64,
    cleanup_interval: u64,
    maintenance: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppContext {
    // == Constructor ==
    /// Builds every component from configuration; fails fast on invalid config.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let responses = Arc::new(SharedCache::new(
            "responses",
            config.cache_max_entries,
            config.default_ttl,
        ));
        let predictions = Arc::new(SharedCache::new(
            "predictions",
            config.prediction_cache_max_entries,
            config.default_ttl,
        ));
        let router = QueryRouter::new(responses.clone(), config.short_query_threshold);

        Ok(Self {
            guard: Arc::new(InputGuard::new(
                config.max_command_length,
                config.max_context_bytes,
            )),
            responses,
            predictions,
            limiter: Arc::new(RateLimiter::new(RateLimitConfig::new(
                config.rate_limit_max_requests,
                config.rate_limit_window,
                config.rate_limit_min_interval,
            ))),
            credentials: Arc::new(CredentialManager::from_config(config)?),
            router: Arc::new(router),
            quota_retry_after: config.quota_retry_after,
            cleanup_interval: config.cleanup_interval,
            maintenance: Arc::new(Mutex::new(None)),
        })
    }

    pub fn quota_retry_after(&self) -> u64 {
        self.quota_retry_after
    }

    // == Prediction Memo ==
    /// Returns the cached prediction for `input`, or runs `predict` and
    /// caches its result under the default TTL.
    ///
    /// The key is derived from the canonical form of `input`, so field order
    /// does not matter. Failed predictions are not cached.
    pub fn predict_with<T, F>(&self, input: &T, predict: F) -> Result<Value>
    where
        T: Serialize,
        F: FnOnce(&T) -> Result<Value>,
    {
        let key = make_key_from(PREDICTION_KEY_NAMESPACE, input)?;
        if let Some(hit) = self.predictions.get(&key) {
            return Ok(hit);
        }

        let value = predict(input)?;
        self.predictions.set(key, value.clone(), None);
        Ok(value)
    }

    // == Maintenance ==
    /// Starts the periodic expiry sweep. Must run inside a tokio runtime.
    /// Calling it again replaces the previous task.
    pub fn spawn_maintenance(&self) {
        let caches: Vec<Arc<dyn ExpirySweep>> = vec![
            self.responses.clone() as Arc<dyn ExpirySweep>,
            self.predictions.clone() as Arc<dyn ExpirySweep>,
            self.limiter.clone() as Arc<dyn ExpirySweep>,
        ];
        let handle = spawn_cleanup_task(caches, self.cleanup_interval);

        if let Some(previous) = self.maintenance.lock().replace(handle) {
            previous.abort();
        }
        info!("Background cleanup task started");
    }

    pub fn is_maintenance_running(&self) -> bool {
        self.maintenance
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Shutdown ==
    /// Stops background work. Safe to call more than once.
    pub fn shutdown(&self) {
        if let Some(handle) = self.maintenance.lock().take() {
            handle.abort();
            warn!("Cleanup task aborted");
        }
    }
}
