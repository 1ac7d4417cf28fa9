//! Per-user presence aggregate and its masked projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::PresenceStatus;

/// The single derived presence snapshot of a user.
///
/// Persisted for read efficiency only: it is always recomputed from the
/// user's current session rows during that user's own heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PresenceAggregate {
    /// The user this snapshot describes.
    pub user_id: Uuid,
    /// Status at the time of computation.
    pub status: PresenceStatus,
    /// Latest `last_seen_at` across all sessions.
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Latest activity across all sessions.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// When this snapshot was computed.
    pub updated_at: DateTime<Utc>,
}

impl PresenceAggregate {
    /// Snapshot for a user with no evidence of presence at all.
    pub fn offline(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            last_seen_at: None,
            last_activity_at: None,
            updated_at: now,
        }
    }
}

/// What one viewer is allowed to see of one target's presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedPresence {
    /// Effective status.
    pub status: PresenceStatus,
    /// Last-seen timestamp, when the target shares it.
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl MaskedPresence {
    /// Full denial. Indistinguishable from a user who is genuinely offline
    /// and has never been seen.
    pub fn hidden() -> Self {
        Self {
            status: PresenceStatus::Offline,
            last_seen_at: None,
        }
    }
}
