//! Query Gatekeeper - governance layer in front of an LLM-backed assistant
//!
//! Validates and sanitizes input, routes queries to a processing mode,
//! caches answers, rate-limits callers and rotates provider credentials.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod gatekeeper;
pub mod guard;
pub mod limiter;
pub mod models;
pub mod provider;
pub mod rotator;
pub mod router;
pub mod tasks;

pub use config::Config;
pub use context::{AppContext, CachedReply};
pub use error::{GatekeeperError, Result};
pub use gatekeeper::{degraded_message, GatedResponse};
pub use provider::{Provider, ProviderError, ProviderReply};
pub use router::{RoutingDecision, RoutingMode};
pub use tasks::spawn_cleanup_task;
