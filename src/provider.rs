//! Provider Contract
//!
//! The text-generation provider is an opaque collaborator. This module fixes
//! the shape of a call and classifies its errors.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Lower-cased substrings that identify quota or rate-limit failures.
pub const QUOTA_MARKERS: &[&str] = &[
    "429",
    "quota",
    "rate limit",
    "rate_limit",
    "ratelimit",
    "resource_exhausted",
    "resource exhausted",
    "too many requests",
];

// == Provider Reply ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReply {
    pub text: String,
    pub confidence: f64,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ProviderReply {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            sources: Vec::new(),
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }
}

// == Provider Error ==
/// Error text returned by the provider, kept verbatim.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the error text carries any quota marker.
    pub fn is_quota_exceeded(&self) -> bool {
        is_quota_message(&self.message)
    }
}

/// Case-insensitive quota marker check on arbitrary error text.
pub fn is_quota_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker))
}

// == Provider Trait ==
/// One call to the external text-generation service.
pub trait Provider: Send + Sync {
    fn generate(
        &self,
        credential: &str,
        prompt: &str,
        context: Option<&Value>,
    ) -> impl Future<Output = Result<ProviderReply, ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_markers_detected() {
        for message in [
            "HTTP 429: slow down",
            "Quota exceeded for project",
            "RESOURCE_EXHAUSTED",
            "Rate limit reached for requests",
            "Too Many Requests",
        ] {
            assert!(ProviderError::new(message).is_quota_exceeded(), "{message}");
        }
    }

    #[test]
    fn test_other_errors_not_quota() {
        assert!(!ProviderError::new("connection reset by peer").is_quota_exceeded());
        assert!(!ProviderError::new("invalid api key").is_quota_exceeded());
    }

    #[test]
    fn test_reply_builder() {
        let reply = ProviderReply::new("answer", 0.7).with_sources(["handbook.pdf"]);
        assert_eq!(reply.sources, vec!["handbook.pdf"]);
        assert_eq!(reply.text, "answer");
    }
}
