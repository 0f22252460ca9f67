//! API Module
//!
//! HTTP handlers and routing for the governance service.
//!
//! # Endpoints
//! - `POST /route` - Validate, sanitize and route a command
//! - `GET /limits/:caller` - Current wait time for a caller
//! - `DELETE /limits/:caller` - Clear a caller's request history
//! - `POST /credentials/reload` - Re-read provider credentials from the environment
//! - `GET /stats` - Cache, guard, limiter and credential statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
