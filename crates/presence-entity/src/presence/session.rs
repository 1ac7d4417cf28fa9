//! Presence session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::PresenceStatus;

/// Placeholder session id for clients that do not send one.
pub const LEGACY_SESSION_ID: &str = "legacy";

/// One client session (tab or device) of a user.
///
/// Created on the first heartbeat, updated on every subsequent one,
/// and deleted on an explicit close or by the janitor after the
/// retention window. Unique per `(user_id, session_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PresenceSession {
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Opaque client-generated identifier, stable for the tab's lifetime.
    pub session_id: String,
    /// Last status reported by this session.
    pub reported_status: PresenceStatus,
    /// When the last heartbeat from this session arrived.
    pub last_seen_at: DateTime<Utc>,
    /// When this session last reported active engagement.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Page the client was on at its last heartbeat.
    pub last_page: Option<String>,
    /// Client description (User-Agent).
    pub client_label: Option<String>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl PresenceSession {
    /// The most recent evidence of activity for this session.
    pub fn activity_or_seen(&self) -> DateTime<Utc> {
        self.last_activity_at.unwrap_or(self.last_seen_at)
    }
}

/// Normalized heartbeat data written to the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertPresenceSession {
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Client session id (already truncated, or [`LEGACY_SESSION_ID`]).
    pub session_id: String,
    /// Folded status to store.
    pub reported_status: PresenceStatus,
    /// Heartbeat time; becomes `last_seen_at` and `updated_at`.
    pub seen_at: DateTime<Utc>,
    /// Set only when the heartbeat signals active engagement. When `None`
    /// the previously stored `last_activity_at` is kept.
    pub activity_at: Option<DateTime<Utc>>,
    /// Truncated page path.
    pub last_page: Option<String>,
    /// Truncated client label.
    pub client_label: Option<String>,
}

impl UpsertPresenceSession {
    /// Apply this upsert on top of an existing row (or create a new one).
    ///
    /// Mirrors the SQL `ON CONFLICT` clause so in-memory stores behave the
    /// same way as PostgreSQL.
    pub fn apply(&self, existing: Option<&PresenceSession>) -> PresenceSession {
        PresenceSession {
            user_id: self.user_id,
            session_id: self.session_id.clone(),
            reported_status: self.reported_status,
            last_seen_at: self.seen_at,
            last_activity_at: self
                .activity_at
                .or_else(|| existing.and_then(|s| s.last_activity_at)),
            last_page: self.last_page.clone(),
            client_label: self.client_label.clone(),
            updated_at: self.seen_at,
        }
    }
}
