//! Presence marker WebSocket.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::request::WsQuery;
use crate::dto::response::MarkerFrame;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /presence/ws: upgrade to a stream of presence change markers.
///
/// Accepts the access token either as a bearer `Authorization` header or
/// as `?token=`.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let bearer = query.token.map(|t| format!("Bearer {t}"));
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .or(bearer.as_deref());
    let user_id = state.jwt_decoder.authenticate(authorization).await?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Forwards markers to one subscriber until either side goes away.
async fn handle_ws_connection(state: AppState, user_id: Uuid, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut markers = state.markers.subscribe();

    info!(%user_id, "Presence marker subscriber connected");

    let outbound_task = tokio::spawn(async move {
        loop {
            let marker = match markers.recv().await {
                Ok(marker) => marker,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%user_id, skipped, "Presence marker subscriber lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let frame = MarkerFrame::PresenceChanged {
                user_id: marker.user_id,
                marker: marker.marker,
            };
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode presence marker frame");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound frames are ignored; the socket is push-only.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    outbound_task.abort();
    debug!(%user_id, "Presence marker subscriber disconnected");
}
