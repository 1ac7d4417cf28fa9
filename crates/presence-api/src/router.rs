//! Route definitions for the presence HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Presence request bodies are a few short strings.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    // The WebSocket is long-lived and stays outside the request timeout.
    let ws_routes = Router::new().route("/presence/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .merge(presence_routes())
        .merge(health_routes())
        .layer(TimeoutLayer::new(timeout))
        .merge(ws_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Presence endpoints
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route("/presence/heartbeat", post(handlers::presence::heartbeat))
        .route("/presence/session/close", post(handlers::presence::close_session))
        .route("/presence/status", get(handlers::presence::statuses))
}

/// Health probes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
}
