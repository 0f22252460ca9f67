//! API Handlers
//!
//! HTTP request handlers for each governance endpoint.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::context::AppContext;
use crate::error::Result;
use crate::models::{
    HealthResponse, ReloadResponse, ResetResponse, RouteRequest, RouteResponse, StatsResponse,
    WaitTimeResponse,
};

/// Handler for POST /route
///
/// Runs the input guard and returns the routing decision for the sanitized
/// command. No provider call is made.
pub async fn route_handler(
    State(ctx): State<AppContext>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>> {
    let input = ctx
        .guard
        .validate_and_sanitize(&req.command, req.context.as_ref())?;
    let decision = ctx.router.route(req.command.trim(), input.context.as_ref());

    Ok(Json(RouteResponse::new(input.command, decision)))
}

/// Handler for GET /limits/:caller
pub async fn wait_time_handler(
    State(ctx): State<AppContext>,
    Path(caller): Path<String>,
) -> Json<WaitTimeResponse> {
    let wait_seconds = ctx.limiter.wait_time(&caller);
    Json(WaitTimeResponse::new(caller, wait_seconds))
}

/// Handler for DELETE /limits/:caller
pub async fn reset_handler(
    State(ctx): State<AppContext>,
    Path(caller): Path<String>,
) -> Json<ResetResponse> {
    let reset = ctx.limiter.reset(&caller);
    Json(ResetResponse::new(caller, reset))
}

/// Handler for POST /credentials/reload
///
/// Fails with a configuration error and keeps the current pool when the
/// environment holds no credentials.
pub async fn reload_handler(State(ctx): State<AppContext>) -> Result<Json<ReloadResponse>> {
    let count = ctx.credentials.reload()?;
    Ok(Json(ReloadResponse::new(count)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(ctx): State<AppContext>) -> Json<StatsResponse> {
    Json(StatsResponse {
        responses: ctx.responses.stats(),
        predictions: ctx.predictions.stats(),
        guard: ctx.guard.stats(),
        limiter: ctx.limiter.stats(),
        credentials: ctx.credentials.stats(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::GatekeeperError;
    use crate::router::{Intent, RoutingMode};

    fn test_ctx() -> AppContext {
        let mut config = Config::default().with_provider_keys(["key-one"]);
        config.rate_limit_max_requests = 1;
        AppContext::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_route_handler_returns_decision() {
        let ctx = test_ctx();
        let req = RouteRequest {
            command: "  Siapa ketua FSKTM?  ".to_string(),
            context: None,
        };

        let response = route_handler(State(ctx.clone()), Json(req)).await.unwrap();

        assert_eq!(response.command, "Siapa ketua FSKTM?");
        assert_eq!(response.decision.mode(), RoutingMode::Knowledge);
        assert_eq!(ctx.guard.stats().passed, 1);
    }

    #[tokio::test]
    async fn test_route_handler_routes_unescaped_text() {
        let req = RouteRequest {
            command: "What's FSKTM?".to_string(),
            context: None,
        };

        let response = route_handler(State(test_ctx()), Json(req)).await.unwrap();

        assert_eq!(response.command, "What&#x27;s FSKTM?");
        assert_eq!(
            response.decision.detected_intents(),
            &[Intent::Faq, Intent::Knowledge]
        );
    }

    #[tokio::test]
    async fn test_route_handler_rejects_suspicious_input() {
        let req = RouteRequest {
            command: "'; DROP TABLE students; --".to_string(),
            context: None,
        };

        let result = route_handler(State(test_ctx()), Json(req)).await;
        assert!(matches!(result, Err(GatekeeperError::InputRejected(_))));
    }

    #[tokio::test]
    async fn test_wait_time_and_reset() {
        let ctx = test_ctx();
        assert!(ctx.limiter.can_make_request("u1"));

        let waiting = wait_time_handler(State(ctx.clone()), Path("u1".to_string())).await;
        assert!(waiting.wait_seconds > 0.0);

        let reset = reset_handler(State(ctx.clone()), Path("u1".to_string())).await;
        assert!(reset.reset);

        let waiting = wait_time_handler(State(ctx), Path("u1".to_string())).await;
        assert_eq!(waiting.wait_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let ctx = test_ctx();
        let response = stats_handler(State(ctx)).await;

        assert_eq!(response.responses.size, 0);
        assert_eq!(response.predictions.max_size, 500);
        assert_eq!(response.credentials.total, 1);
        assert_eq!(response.limiter.admitted, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
