//! In-memory stores and collaborators for tests.
//!
//! Each double can be told to fail so that degradation paths are testable.
//! None of them is meant for production use: presence state must live in
//! the shared store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use presence_core::config::presence::PresenceConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_entity::presence::{
    PresenceAggregate, PresenceSession, PresenceStatus, UpsertPresenceSession,
};

use crate::presence::PresenceService;
use crate::store::{
    AggregateStore, EventMarker, MembershipSource, PresenceStores, ProfileSettingsSource,
    SessionStore,
};

/// A session row last seen (and active) at `seen`.
pub fn session_row(
    user_id: Uuid,
    session_id: &str,
    status: PresenceStatus,
    seen: DateTime<Utc>,
) -> PresenceSession {
    PresenceSession {
        user_id,
        session_id: session_id.to_string(),
        reported_status: status,
        last_seen_at: seen,
        last_activity_at: (status == PresenceStatus::Online).then_some(seen),
        last_page: None,
        client_label: None,
        updated_at: seen,
    }
}

fn injected(what: &str) -> AppError {
    AppError::database(format!("injected {what} failure"))
}

/// Session rows keyed by `(user_id, session_id)`.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    rows: RwLock<HashMap<(Uuid, String), PresenceSession>>,
    fail_upserts: AtomicBool,
}

impl InMemorySessionStore {
    /// Insert a row directly, bypassing upsert semantics.
    pub async fn insert(&self, row: PresenceSession) {
        self.rows
            .write()
            .await
            .insert((row.user_id, row.session_id.clone()), row);
    }

    /// Make subsequent upserts fail.
    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn upsert(&self, data: &UpsertPresenceSession) -> AppResult<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(injected("session upsert"));
        }
        let mut rows = self.rows.write().await;
        let key = (data.user_id, data.session_id.clone());
        let row = data.apply(rows.get(&key));
        rows.insert(key, row);
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<PresenceSession>> {
        let rows = self.rows.read().await;
        let mut sessions: Vec<_> = rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_seen_at.cmp(&a.last_seen_at));
        Ok(sessions)
    }

    async fn delete(&self, user_id: Uuid, session_id: &str) -> AppResult<bool> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(&(user_id, session_id.to_string())).is_some())
    }

    async fn delete_stale_for_user(&self, user_id: Uuid, before: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let before_len = rows.len();
        rows.retain(|(owner, _), s| *owner != user_id || s.last_seen_at >= before);
        Ok((before_len - rows.len()) as u64)
    }
}

/// Aggregate snapshots keyed by user.
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    rows: RwLock<HashMap<Uuid, PresenceAggregate>>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl InMemoryAggregateStore {
    /// The stored snapshot of `user_id`.
    pub async fn get(&self, user_id: Uuid) -> Option<PresenceAggregate> {
        self.rows.read().await.get(&user_id).cloned()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every read and write fail.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AggregateStore for InMemoryAggregateStore {
    async fn upsert(&self, aggregate: &PresenceAggregate) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("aggregate write"));
        }
        self.rows
            .write()
            .await
            .insert(aggregate.user_id, aggregate.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> AppResult<Vec<PresenceAggregate>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected("aggregate read"));
        }
        let rows = self.rows.read().await;
        Ok(user_ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }
}

/// Profile settings blobs keyed by user.
#[derive(Debug, Default)]
pub struct InMemoryProfiles {
    settings: RwLock<HashMap<Uuid, serde_json::Value>>,
}

impl InMemoryProfiles {
    /// Replace the settings blob of `user_id`.
    pub async fn set(&self, user_id: Uuid, settings: serde_json::Value) {
        self.settings.write().await.insert(user_id, settings);
    }
}

#[async_trait]
impl ProfileSettingsSource for InMemoryProfiles {
    async fn settings_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, serde_json::Value>> {
        let settings = self.settings.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| settings.get(id).map(|s| (*id, s.clone())))
            .collect())
    }
}

/// Group memberships, counting provider calls.
#[derive(Debug, Default)]
pub struct InMemoryMemberships {
    groups: RwLock<HashMap<Uuid, HashSet<Uuid>>>,
    calls: AtomicUsize,
}

impl InMemoryMemberships {
    /// Add `user_id` to `group_id`.
    pub async fn add(&self, user_id: Uuid, group_id: Uuid) {
        self.groups
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(group_id);
    }

    /// Number of `groups_of` calls so far.
    pub async fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipSource for InMemoryMemberships {
    async fn groups_of(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, HashSet<Uuid>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let groups = self.groups.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| groups.get(id).map(|g| (*id, g.clone())))
            .collect())
    }
}

/// Counts marker bumps per user.
#[derive(Debug, Default)]
pub struct RecordingEventMarker {
    markers: RwLock<HashMap<Uuid, i64>>,
    fail: AtomicBool,
}

impl RecordingEventMarker {
    /// Current marker of `user_id` (0 if never bumped).
    pub async fn value(&self, user_id: Uuid) -> i64 {
        self.markers.read().await.get(&user_id).copied().unwrap_or(0)
    }

    /// Make subsequent bumps fail.
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventMarker for RecordingEventMarker {
    async fn bump(&self, user_id: Uuid) -> AppResult<i64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::cache("injected marker failure"));
        }
        let mut markers = self.markers.write().await;
        let marker = markers.entry(user_id).or_insert(0);
        *marker += 1;
        Ok(*marker)
    }
}

/// A [`PresenceService`] wired to in-memory doubles, with handles to each.
#[derive(Debug, Clone)]
pub struct InMemoryPresence {
    /// The service under test.
    pub service: PresenceService,
    /// Session rows.
    pub sessions: Arc<InMemorySessionStore>,
    /// Aggregate snapshots.
    pub aggregates: Arc<InMemoryAggregateStore>,
    /// Profile settings.
    pub profiles: Arc<InMemoryProfiles>,
    /// Group memberships.
    pub memberships: Arc<InMemoryMemberships>,
    /// Change marker.
    pub marker: Arc<RecordingEventMarker>,
}

impl InMemoryPresence {
    /// Default presence configuration.
    pub fn new() -> Self {
        Self::with_config(&PresenceConfig::default())
    }

    /// Custom presence configuration.
    pub fn with_config(config: &PresenceConfig) -> Self {
        let sessions = Arc::new(InMemorySessionStore::default());
        let aggregates = Arc::new(InMemoryAggregateStore::default());
        let profiles = Arc::new(InMemoryProfiles::default());
        let memberships = Arc::new(InMemoryMemberships::default());
        let marker = Arc::new(RecordingEventMarker::default());

        let stores = PresenceStores {
            sessions: sessions.clone(),
            aggregates: aggregates.clone(),
            profiles: profiles.clone(),
            memberships: memberships.clone(),
            marker: marker.clone(),
        };

        Self {
            service: PresenceService::new(config, stores),
            sessions,
            aggregates,
            profiles,
            memberships,
            marker,
        }
    }

    /// The stores of this environment with a different event marker.
    pub fn stores_with_marker(&self, marker: Arc<dyn EventMarker>) -> PresenceStores {
        PresenceStores {
            sessions: self.sessions.clone(),
            aggregates: self.aggregates.clone(),
            profiles: self.profiles.clone(),
            memberships: self.memberships.clone(),
            marker,
        }
    }
}

impl Default for InMemoryPresence {
    fn default() -> Self {
        Self::new()
    }
}
