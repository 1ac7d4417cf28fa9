//! Presence handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};

use presence_service::parse_user_ids;

use crate::dto::request::{CloseSessionRequest, HeartbeatRequest, StatusQuery};
use crate::dto::response::{CloseSessionResponse, HeartbeatResponse, StatusResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /presence/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> ApiResult<Json<HeartbeatResponse>> {
    let req = HeartbeatRequest::from_body(&body)?;
    let outcome = state
        .presence
        .record_heartbeat(auth.context(), &req.into())
        .await?;

    Ok(Json(HeartbeatResponse {
        success: true,
        status: outcome.status,
        last_seen_at: outcome.last_seen_at,
    }))
}

/// POST /presence/session/close
pub async fn close_session(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> ApiResult<Json<CloseSessionResponse>> {
    let req = CloseSessionRequest::from_body(&body)?;
    state
        .presence
        .close_session(auth.context(), &req.session_id)
        .await?;

    Ok(Json(CloseSessionResponse { ok: true }))
}

/// GET /presence/status?user_ids=a,b,c
pub async fn statuses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let targets = parse_user_ids(
        query.user_ids.as_deref(),
        auth.user_id,
        state.presence.max_batch_size(),
    )?;
    let statuses = state.presence.statuses(auth.context(), &targets).await?;

    Ok(Json(StatusResponse { statuses }))
}
