//! Query Router Module
//!
//! Classifies validated commands into processing modes.

mod decision;
mod patterns;
mod query;

pub use decision::{RoutingDecision, RoutingMode};
pub use patterns::{Intent, PatternTable};
pub use query::{
    complexity_score, normalize_command, query_cache_key, QueryRouter, DEFAULT_SHORT_THRESHOLD,
    QUERY_KEY_NAMESPACE,
};
