//! Storage and collaborator seams of the presence engine.
//!
//! The engine holds no presence state of its own: every read and write goes
//! through these traits so that any number of server instances observe the
//! same data. PostgreSQL implementations wrap the repositories of
//! `presence-database`; in-memory doubles live in [`crate::testing`].

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use presence_core::result::AppResult;
use presence_database::repositories::{
    GroupMembershipRepository, PresenceAggregateRepository, PresenceSessionRepository,
    ProfileSettingsRepository,
};
use presence_entity::presence::{PresenceAggregate, PresenceSession, UpsertPresenceSession};

/// Per-(user, session) rows.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug + 'static {
    /// Atomically insert or update one session row.
    async fn upsert(&self, data: &UpsertPresenceSession) -> AppResult<()>;

    /// All current rows of one user.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<PresenceSession>>;

    /// Delete one row. Returns whether it existed.
    async fn delete(&self, user_id: Uuid, session_id: &str) -> AppResult<bool>;

    /// Delete a user's rows last seen strictly before `before`.
    async fn delete_stale_for_user(&self, user_id: Uuid, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Persisted per-user snapshots.
#[async_trait]
pub trait AggregateStore: Send + Sync + Debug + 'static {
    /// Replace the snapshot of `aggregate.user_id`.
    async fn upsert(&self, aggregate: &PresenceAggregate) -> AppResult<()>;

    /// Snapshots of the given users. Users without one are omitted.
    async fn find_many(&self, user_ids: &[Uuid]) -> AppResult<Vec<PresenceAggregate>>;
}

/// Profile Settings Provider: raw settings blobs, batched.
#[async_trait]
pub trait ProfileSettingsSource: Send + Sync + Debug + 'static {
    /// Settings blob of each user that has a profile.
    async fn settings_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, serde_json::Value>>;
}

/// Group Membership Provider, batched.
#[async_trait]
pub trait MembershipSource: Send + Sync + Debug + 'static {
    /// Group ids of each user. Users without memberships may be omitted.
    async fn groups_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, HashSet<Uuid>>>;
}

/// Signals "something changed for this user" to realtime subscribers.
#[async_trait]
pub trait EventMarker: Send + Sync + Debug + 'static {
    /// Bump the user's marker and return its new value.
    async fn bump(&self, user_id: Uuid) -> AppResult<i64>;
}

/// Every store and collaborator the presence service needs.
#[derive(Debug, Clone)]
pub struct PresenceStores {
    /// Session rows.
    pub sessions: Arc<dyn SessionStore>,
    /// Aggregate snapshots.
    pub aggregates: Arc<dyn AggregateStore>,
    /// Profile settings.
    pub profiles: Arc<dyn ProfileSettingsSource>,
    /// Group memberships.
    pub memberships: Arc<dyn MembershipSource>,
    /// Change marker.
    pub marker: Arc<dyn EventMarker>,
}

#[async_trait]
impl SessionStore for PresenceSessionRepository {
    async fn upsert(&self, data: &UpsertPresenceSession) -> AppResult<()> {
        PresenceSessionRepository::upsert(self, data).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<PresenceSession>> {
        self.find_by_user(user_id).await
    }

    async fn delete(&self, user_id: Uuid, session_id: &str) -> AppResult<bool> {
        PresenceSessionRepository::delete(self, user_id, session_id).await
    }

    async fn delete_stale_for_user(&self, user_id: Uuid, before: DateTime<Utc>) -> AppResult<u64> {
        PresenceSessionRepository::delete_stale_for_user(self, user_id, before).await
    }
}

#[async_trait]
impl AggregateStore for PresenceAggregateRepository {
    async fn upsert(&self, aggregate: &PresenceAggregate) -> AppResult<()> {
        PresenceAggregateRepository::upsert(self, aggregate).await
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> AppResult<Vec<PresenceAggregate>> {
        PresenceAggregateRepository::find_many(self, user_ids).await
    }
}

#[async_trait]
impl ProfileSettingsSource for ProfileSettingsRepository {
    async fn settings_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, serde_json::Value>> {
        self.find_settings(user_ids).await
    }
}

#[async_trait]
impl MembershipSource for GroupMembershipRepository {
    async fn groups_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, HashSet<Uuid>>> {
        self.find_groups(user_ids).await
    }
}
