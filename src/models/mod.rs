//! Request and Response models for the governance API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::RouteRequest;
pub use responses::{
    ErrorResponse, HealthResponse, ReloadResponse, ResetResponse, RouteResponse, StatsResponse,
    WaitTimeResponse,
};
