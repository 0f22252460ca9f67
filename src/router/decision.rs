//! Routing Decision Module
//!
//! Output of the query router: processing mode plus the evidence behind it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::router::Intent;

// == Routing Mode ==
/// Processing path selected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Served from cache or a canned reply, no provider call.
    FastPath,
    /// Retrieval-augmented answer without multi-step tool use.
    Knowledge,
    /// Structured multi-step data lookups.
    Tools,
    /// Knowledge retrieval and tool use together.
    Combined,
}

impl RoutingMode {
    /// True when serving this mode needs the external provider.
    pub fn requires_provider(&self) -> bool {
        !matches!(self, RoutingMode::FastPath)
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastPath => write!(f, "fast_path"),
            Self::Knowledge => write!(f, "knowledge"),
            Self::Tools => write!(f, "tools"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

// == Routing Decision ==
/// Immutable per-query routing result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    mode: RoutingMode,
    confidence: f64,
    reason: String,
    cache_key: String,
    detected_intents: Vec<Intent>,
}

impl RoutingDecision {
    pub fn new(
        mode: RoutingMode,
        confidence: f64,
        reason: impl Into<String>,
        cache_key: impl Into<String>,
        detected_intents: Vec<Intent>,
    ) -> Self {
        Self {
            mode,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            cache_key: cache_key.into(),
            detected_intents,
        }
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn detected_intents(&self) -> &[Intent] {
        &self.detected_intents
    }

    pub fn requires_provider(&self) -> bool {
        self.mode.requires_provider()
    }
}
