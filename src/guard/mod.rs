//! Input Guard Module
//!
//! Validation and sanitization of raw commands and context objects.

mod input;
mod patterns;
mod sanitize;


pub use input::{
    GuardStats, InputGuard, SanitizedInput, DEFAULT_MAX_COMMAND_LENGTH, DEFAULT_MAX_CONTEXT_BYTES,
};
pub use patterns::is_suspicious;
pub use sanitize::{collapse_whitespace, escape_html, sanitize_text};
