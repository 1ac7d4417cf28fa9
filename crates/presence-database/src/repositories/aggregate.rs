//! Presence aggregate repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use presence_core::error::{AppError, ErrorKind};
use presence_core::result::AppResult;
use presence_entity::presence::PresenceAggregate;

/// Repository for the persisted per-user presence snapshot.
#[derive(Debug, Clone)]
pub struct PresenceAggregateRepository {
    pool: PgPool,
}

impl PresenceAggregateRepository {
    /// Create a new presence aggregate repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write the snapshot for its user, replacing any previous one.
    pub async fn upsert(&self, aggregate: &PresenceAggregate) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO presence_aggregates (user_id, status, last_seen_at, last_activity_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
             status = EXCLUDED.status, \
             last_seen_at = EXCLUDED.last_seen_at, \
             last_activity_at = EXCLUDED.last_activity_at, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(aggregate.user_id)
        .bind(aggregate.status)
        .bind(aggregate.last_seen_at)
        .bind(aggregate.last_activity_at)
        .bind(aggregate.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write presence aggregate", e)
        })?;
        Ok(())
    }

    /// Load the snapshots of many users in one query. Users without a
    /// snapshot are simply absent from the result.
    pub async fn find_many(&self, user_ids: &[Uuid]) -> AppResult<Vec<PresenceAggregate>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PresenceAggregate>(
            "SELECT * FROM presence_aggregates WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load presence aggregates", e)
        })
    }
}
