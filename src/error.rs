//! Error types for the governance layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Gatekeeper Error Enum ==
/// Unified error type for the governance layer.
///
/// A cache miss is not represented here; lookups return `Option`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatekeeperError {
    /// Input guard rejected the command or context
    #[error("Input rejected: {0}")]
    InputRejected(String),

    /// Caller exceeded its request budget
    #[error("Rate limit exceeded, retry in {wait_seconds:.1}s")]
    RateLimited { wait_seconds: f64 },

    /// Every provider credential is cooling down
    #[error("All provider credentials are cooling down")]
    CredentialsExhausted,

    /// Provider reported a quota or rate-limit failure
    #[error("Provider quota exceeded, retry in {retry_after}s")]
    ProviderQuota { retry_after: u64 },

    /// Provider failed for any other reason
    #[error("Provider error: {0}")]
    Provider(String),

    /// Invalid configuration detected at startup or reload
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatekeeperError {
    // == Retry Hint ==
    /// Seconds after which the caller may retry, when the error is transient.
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            GatekeeperError::RateLimited { wait_seconds } => Some(*wait_seconds),
            GatekeeperError::ProviderQuota { retry_after } => Some(*retry_after as f64),
            _ => None,
        }
    }

    /// True for the "busy" family: rate limited, exhausted, or provider quota.
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            GatekeeperError::RateLimited { .. }
                | GatekeeperError::CredentialsExhausted
                | GatekeeperError::ProviderQuota { .. }
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatekeeperError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatekeeperError::InputRejected(_) => StatusCode::BAD_REQUEST,
            GatekeeperError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatekeeperError::CredentialsExhausted => StatusCode::SERVICE_UNAVAILABLE,
            GatekeeperError::ProviderQuota { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatekeeperError::Provider(_) => StatusCode::BAD_GATEWAY,
            GatekeeperError::Config(_) | GatekeeperError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.to_string()).with_retry_after(self.retry_after());

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the governance layer.
pub type Result<T> = std::result::Result<T, GatekeeperError>;
