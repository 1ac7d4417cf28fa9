//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use presence_core::traits::cache::CacheProvider;

use crate::dto::response::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match &state.db {
        Some(db) => Some(db.health_check().await.unwrap_or_else(|e| {
            warn!(error = %e, "Database readiness check failed");
            false
        })),
        None => None,
    };
    let cache = state.cache.health_check().await.unwrap_or_else(|e| {
        warn!(error = %e, "Cache readiness check failed");
        false
    });

    let ready = cache && database.unwrap_or(true);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "unavailable" }.to_string(),
            database,
            cache,
        }),
    )
}
