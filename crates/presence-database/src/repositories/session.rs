//! Presence session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use presence_core::error::{AppError, ErrorKind};
use presence_core::result::AppResult;
use presence_entity::presence::{PresenceSession, UpsertPresenceSession};

/// Repository for per-tab presence session rows.
#[derive(Debug, Clone)]
pub struct PresenceSessionRepository {
    pool: PgPool,
}

impl PresenceSessionRepository {
    /// Create a new presence session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the row for `(user_id, session_id)`.
    ///
    /// `last_activity_at` is only overwritten when the upsert carries one.
    pub async fn upsert(&self, data: &UpsertPresenceSession) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO presence_sessions \
             (user_id, session_id, reported_status, last_seen_at, last_activity_at, last_page, client_label, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $4) \
             ON CONFLICT (user_id, session_id) DO UPDATE SET \
             reported_status = EXCLUDED.reported_status, \
             last_seen_at = EXCLUDED.last_seen_at, \
             last_activity_at = COALESCE(EXCLUDED.last_activity_at, presence_sessions.last_activity_at), \
             last_page = EXCLUDED.last_page, \
             client_label = EXCLUDED.client_label, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(data.user_id)
        .bind(&data.session_id)
        .bind(data.reported_status)
        .bind(data.seen_at)
        .bind(data.activity_at)
        .bind(&data.last_page)
        .bind(&data.client_label)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert presence session", e)
        })?;
        Ok(())
    }

    /// List every session row of a user.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<PresenceSession>> {
        sqlx::query_as::<_, PresenceSession>(
            "SELECT * FROM presence_sessions WHERE user_id = $1 ORDER BY last_seen_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list presence sessions", e)
        })
    }

    /// Delete one session row. Returns `true` if a row was removed.
    pub async fn delete(&self, user_id: Uuid, session_id: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM presence_sessions WHERE user_id = $1 AND session_id = $2")
                .bind(user_id)
                .bind(session_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to delete presence session",
                        e,
                    )
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user's own rows last seen before the cutoff.
    pub async fn delete_stale_for_user(
        &self,
        user_id: Uuid,
        before: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM presence_sessions WHERE user_id = $1 AND last_seen_at < $2",
        )
        .bind(user_id)
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to delete stale presence sessions",
                e,
            )
        })?;
        Ok(result.rows_affected())
    }
}
