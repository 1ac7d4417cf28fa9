//! Inline retention sweep of a user's own session rows.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use presence_core::result::AppResult;

use crate::store::SessionStore;

/// Deletes a user's session rows older than the retention window.
///
/// Runs during that user's own heartbeat; there is no global sweep, so
/// rows of users who never come back stay until they do. Such rows are
/// already ignored by aggregation once stale.
#[derive(Debug, Clone)]
pub struct SessionJanitor {
    sessions: Arc<dyn SessionStore>,
    retention: Duration,
}

impl SessionJanitor {
    /// Creates a janitor over `sessions` with the given retention.
    pub fn new(sessions: Arc<dyn SessionStore>, retention: Duration) -> Self {
        Self {
            sessions,
            retention,
        }
    }

    /// Delete rows of `user_id` last seen before `now - retention`.
    pub async fn sweep(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        // A retention reaching past the earliest representable time keeps everything.
        let Some(cutoff) = now.checked_sub_signed(self.retention) else {
            return Ok(0);
        };
        let removed = self.sessions.delete_stale_for_user(user_id, cutoff).await?;
        if removed > 0 {
            debug!(%user_id, removed, %cutoff, "Removed stale presence sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySessionStore, session_row};
    use presence_entity::presence::PresenceStatus;

    #[tokio::test]
    async fn test_sweep_only_touches_own_expired_rows() {
        let store = Arc::new(InMemorySessionStore::default());
        let now = Utc::now();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .insert(session_row(me, "old", PresenceStatus::Online, now - Duration::days(8)))
            .await;
        store
            .insert(session_row(me, "fresh", PresenceStatus::Online, now - Duration::days(6)))
            .await;
        store
            .insert(session_row(other, "old", PresenceStatus::Online, now - Duration::days(30)))
            .await;

        let janitor = SessionJanitor::new(store.clone(), Duration::days(7));
        assert_eq!(janitor.sweep(me, now).await.unwrap(), 1);

        let mine = store.list_for_user(me).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].session_id, "fresh");
        assert_eq!(store.list_for_user(other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_retention_keeps_rows() {
        let store = Arc::new(InMemorySessionStore::default());
        let now = Utc::now();
        let me = Uuid::new_v4();
        store
            .insert(session_row(me, "ancient", PresenceStatus::Online, now - Duration::days(3650)))
            .await;

        let janitor = SessionJanitor::new(store.clone(), Duration::MAX);
        assert_eq!(janitor.sweep(me, now).await.unwrap(), 0);
        assert_eq!(store.list_for_user(me).await.unwrap().len(), 1);
    }
}
