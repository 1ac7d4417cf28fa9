//! Read access to group memberships.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use presence_core::error::{AppError, ErrorKind};
use presence_core::result::AppResult;

/// Reads `group_members` rows.
#[derive(Debug, Clone)]
pub struct GroupMembershipRepository {
    pool: PgPool,
}

impl GroupMembershipRepository {
    /// Create a new group membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Group ids of every given user, in one query. Users without any
    /// membership are absent from the result.
    pub async fn find_groups(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, HashSet<Uuid>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, group_id FROM group_members WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load group memberships", e)
        })?;

        let mut groups: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for (user_id, group_id) in rows {
            groups.entry(user_id).or_default().insert(group_id);
        }
        Ok(groups)
    }
}
