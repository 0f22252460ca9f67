//! Input Guard Module
//!
//! First stage of the pipeline: validates raw command text and the optional
//! context object, then produces sanitized copies for downstream use.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{GatekeeperError, Result};
use crate::guard::patterns::is_suspicious;
use crate::guard::sanitize::sanitize_text;

/// Default maximum command length in characters
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 2000;

/// Default maximum serialized context size in bytes
pub const DEFAULT_MAX_CONTEXT_BYTES: usize = 10_000;

const DISALLOWED_PATTERN: &str = "contains disallowed pattern";

// == Guard Stats ==
/// Running validation counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GuardStats {
    pub passed: u64,
    pub rejected: u64,
}

// == Sanitized Input ==
/// Command and context that passed validation, in sanitized form.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedInput {
    pub command: String,
    pub context: Option<Value>,
}

// == Input Guard ==
#[derive(Debug)]
pub struct InputGuard {
    max_command_length: usize,
    max_context_bytes: usize,
    passed: AtomicU64,
    rejected: AtomicU64,
}

impl Default for InputGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMMAND_LENGTH, DEFAULT_MAX_CONTEXT_BYTES)
    }
}

impl InputGuard {
    pub fn new(max_command_length: usize, max_context_bytes: usize) -> Self {
        Self {
            max_command_length,
            max_context_bytes,
            passed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn max_command_length(&self) -> usize {
        self.max_command_length
    }

    // == Validate ==
    /// Checks emptiness, length and suspicious patterns.
    ///
    /// A pattern hit is reported only as "contains disallowed pattern".
    pub fn validate(&self, command: &str) -> Result<()> {
        let outcome = self.check_command(command);
        self.record(&outcome);
        outcome
    }

    fn check_command(&self, command: &str) -> Result<()> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(reject("command is empty"));
        }

        let length = trimmed.chars().count();
        if length > self.max_command_length {
            return Err(reject(format!(
                "command exceeds maximum length of {} characters",
                self.max_command_length
            )));
        }

        if is_suspicious(command) {
            return Err(reject(DISALLOWED_PATTERN));
        }

        Ok(())
    }

    // == Sanitize ==
    /// Trims, strips NUL bytes, escapes HTML, collapses whitespace and
    /// truncates to the maximum length. Never fails.
    pub fn sanitize(&self, command: &str) -> String {
        sanitize_text(command, self.max_command_length)
    }

    // == Context ==
    /// The context must be a JSON object whose serialized size fits the ceiling.
    pub fn validate_context(&self, context: &Value) -> Result<()> {
        let outcome = self.check_context(context);
        self.record(&outcome);
        outcome
    }

    fn check_context(&self, context: &Value) -> Result<()> {
        if !context.is_object() {
            return Err(reject("context must be an object"));
        }

        let size = serde_json::to_vec(context)
            .map(|bytes| bytes.len())
            .map_err(|e| GatekeeperError::Internal(format!("cannot measure context: {e}")))?;
        if size > self.max_context_bytes {
            return Err(reject(format!(
                "context exceeds maximum size of {} bytes",
                self.max_context_bytes
            )));
        }

        Ok(())
    }

    /// Sanitizes every string leaf, recursing through objects and arrays.
    pub fn sanitize_context(&self, context: &Value) -> Value {
        match context {
            Value::String(s) => Value::String(self.sanitize(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.sanitize_context(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.sanitize_context(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    // == Validate And Sanitize ==
    pub fn validate_and_sanitize(
        &self,
        command: &str,
        context: Option<&Value>,
    ) -> Result<SanitizedInput> {
        self.validate(command)?;
        if let Some(ctx) = context {
            self.validate_context(ctx)?;
        }

        Ok(SanitizedInput {
            command: self.sanitize(command),
            context: context.map(|ctx| self.sanitize_context(ctx)),
        })
    }

    pub fn stats(&self) -> GuardStats {
        GuardStats {
            passed: self.passed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    fn record(&self, outcome: &Result<()>) {
        match outcome {
            Ok(()) => {
                self.passed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "input guard rejected request");
            }
        }
    }
}

fn reject(reason: impl Into<String>) -> GatekeeperError {
    GatekeeperError::InputRejected(reason.into())
}
