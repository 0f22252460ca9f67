//! Request DTOs for the governance API

use serde::Deserialize;
use serde_json::Value;

/// Request body for POST /route
///
/// # Fields
/// - `command`: Raw user command, validated and sanitized before routing
/// - `context`: Optional JSON object forwarded with the command
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub command: String,
    #[serde(default)]
    pub context: Option<Value>,
}
