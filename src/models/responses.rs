//! Response DTOs for the governance API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::guard::GuardStats;
use crate::limiter::LimiterStats;
use crate::rotator::CredentialStats;
use crate::router::RoutingDecision;

/// Response body for POST /route
#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    /// Command after sanitization, as it was routed
    pub command: String,
    pub decision: RoutingDecision,
}

impl RouteResponse {
    pub fn new(command: impl Into<String>, decision: RoutingDecision) -> Self {
        Self {
            command: command.into(),
            decision,
        }
    }
}

/// Response body for GET /limits/:caller
#[derive(Debug, Clone, Serialize)]
pub struct WaitTimeResponse {
    pub caller: String,
    /// Seconds until the next request would be admitted; 0 when it would be now
    pub wait_seconds: f64,
}

impl WaitTimeResponse {
    pub fn new(caller: impl Into<String>, wait_seconds: f64) -> Self {
        Self {
            caller: caller.into(),
            wait_seconds,
        }
    }
}

/// Response body for DELETE /limits/:caller
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub caller: String,
    /// False when the caller had no recorded history
    pub reset: bool,
}

impl ResetResponse {
    pub fn new(caller: impl Into<String>, reset: bool) -> Self {
        Self {
            caller: caller.into(),
            reset,
        }
    }
}

/// Response body for POST /credentials/reload
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub message: String,
    pub credentials: usize,
}

impl ReloadResponse {
    pub fn new(credentials: usize) -> Self {
        Self {
            message: format!("Loaded {credentials} provider credentials"),
            credentials,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub responses: CacheStats,
    pub predictions: CacheStats,
    pub guard: GuardStats,
    pub limiter: LimiterStats,
    pub credentials: CredentialStats,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Seconds after which a retry may succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<f64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Option<f64>) -> Self {
        self.retry_after = retry_after;
        self
    }
}
