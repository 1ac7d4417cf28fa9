//! Response DTOs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use presence_entity::presence::{MaskedPresence, PresenceStatus};

/// `POST /presence/heartbeat` response: the caller's own, unmasked presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Always `true`.
    pub success: bool,
    /// Freshly aggregated status.
    pub status: PresenceStatus,
    /// Latest heartbeat across the caller's sessions.
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// `POST /presence/session/close` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseSessionResponse {
    /// Always `true`; closing an unknown session is not an error.
    pub ok: bool,
}

/// `GET /presence/status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Masked presence per requested user.
    pub statuses: HashMap<Uuid, MaskedPresence>,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health/ready` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// `"ready"` or `"unavailable"`.
    pub status: String,
    /// Database reachability; `None` when no database is configured.
    pub database: Option<bool>,
    /// Cache reachability.
    pub cache: bool,
}

/// Frame pushed over `GET /presence/ws`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerFrame {
    /// Presence of `user_id` changed; re-fetch through the status endpoint.
    PresenceChanged {
        /// User whose presence changed.
        user_id: Uuid,
        /// Marker value.
        marker: i64,
    },
}
