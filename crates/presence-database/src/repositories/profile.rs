//! Read access to profile settings blobs.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use presence_core::error::{AppError, ErrorKind};
use presence_core::result::AppResult;

/// Reads the raw `profiles.settings` JSON of users.
#[derive(Debug, Clone)]
pub struct ProfileSettingsRepository {
    pool: PgPool,
}

impl ProfileSettingsRepository {
    /// Create a new profile settings repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the settings blobs of many users in one query.
    pub async fn find_settings(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, serde_json::Value>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, Option<serde_json::Value>)>(
            "SELECT id, settings FROM profiles WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load profile settings", e)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, settings)| settings.map(|s| (id, s)))
            .collect())
    }
}
