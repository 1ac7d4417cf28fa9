//! Presence service: heartbeats, session close, and masked status reads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use presence_core::config::presence::PresenceConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_entity::presence::{MaskedPresence, PresenceStatus};
use presence_entity::privacy::{PrivacySettings, Visibility};

use super::aggregator::Aggregator;
use super::janitor::SessionJanitor;
use super::masker::VisibilityMasker;
use super::privacy::PrivacyResolver;
use super::recorder::{HeartbeatInput, SessionRecorder};
use super::shared_context::SharedContextResolver;
use super::staleness::StalenessEvaluator;
use crate::context::RequestContext;
use crate::store::{AggregateStore, EventMarker, PresenceStores, SessionStore};

/// What the caller learns about itself after a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatOutcome {
    /// Freshly aggregated status.
    pub status: PresenceStatus,
    /// Latest `last_seen_at` across the caller's sessions.
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Presence engine entry point.
///
/// Stateless: every call reads and writes only through the injected stores.
#[derive(Debug, Clone)]
pub struct PresenceService {
    /// Session rows.
    sessions: Arc<dyn SessionStore>,
    /// Aggregate snapshots.
    aggregates: Arc<dyn AggregateStore>,
    /// Change marker.
    marker: Arc<dyn EventMarker>,
    /// Heartbeat normalization.
    recorder: SessionRecorder,
    /// Retention sweep.
    janitor: SessionJanitor,
    /// Session-set folding.
    aggregator: Aggregator,
    /// Privacy settings.
    privacy: PrivacyResolver,
    /// Shared group membership.
    shared_context: SharedContextResolver,
    /// Per-viewer projection.
    masker: VisibilityMasker,
    /// Maximum number of ids in one status query.
    max_batch_size: usize,
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(config: &PresenceConfig, stores: PresenceStores) -> Self {
        let evaluator = StalenessEvaluator::new(config.windows());
        Self {
            recorder: SessionRecorder::new(config),
            janitor: SessionJanitor::new(stores.sessions.clone(), config.retention()),
            aggregator: Aggregator::new(evaluator),
            privacy: PrivacyResolver::new(stores.profiles),
            shared_context: SharedContextResolver::new(stores.memberships),
            masker: VisibilityMasker::new(evaluator),
            sessions: stores.sessions,
            aggregates: stores.aggregates,
            marker: stores.marker,
            max_batch_size: config.max_batch_size,
        }
    }

    /// Maximum number of ids accepted by [`PresenceService::statuses`].
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Record a heartbeat from one session of the caller and recompute the
    /// caller's aggregate.
    ///
    /// A failed session upsert or retention sweep is logged and the
    /// aggregate is computed from whatever rows the store still returns.
    /// Failing to list sessions or to persist the aggregate is an error.
    pub async fn record_heartbeat(
        &self,
        ctx: &RequestContext,
        input: &HeartbeatInput,
    ) -> AppResult<HeartbeatOutcome> {
        let user_id = ctx.user_id;
        let now = ctx.request_time;
        let (signal, upsert) = self.recorder.normalize(ctx, input);

        if let Err(e) = self.sessions.upsert(&upsert).await {
            warn!(
                %user_id,
                session_id = %upsert.session_id,
                error = %e,
                "Presence session upsert failed; aggregating from known sessions"
            );
        }

        if let Err(e) = self.janitor.sweep(user_id, now).await {
            warn!(%user_id, error = %e, "Presence session retention sweep failed");
        }

        let sessions = self.sessions.list_for_user(user_id).await?;
        let aggregate = self.aggregator.aggregate(user_id, &sessions, now);
        self.aggregates.upsert(&aggregate).await?;

        match self.marker.bump(user_id).await {
            Ok(marker) => debug!(%user_id, marker, "Presence marker bumped"),
            Err(e) => warn!(%user_id, error = %e, "Presence marker bump failed"),
        }

        debug!(
            %user_id,
            signal = ?signal,
            status = %aggregate.status,
            sessions = sessions.len(),
            "Heartbeat recorded"
        );

        Ok(HeartbeatOutcome {
            status: aggregate.status,
            last_seen_at: aggregate.last_seen_at,
        })
    }

    /// Delete one session row of the caller.
    ///
    /// The stored aggregate is left as is and keeps decaying until the
    /// caller's next heartbeat. Returns whether a row was removed.
    pub async fn close_session(&self, ctx: &RequestContext, session_id: &str) -> AppResult<bool> {
        let session_id = self
            .recorder
            .session_id(Some(session_id))
            .ok_or_else(|| AppError::validation("session_id is required"))?;

        let removed = self.sessions.delete(ctx.user_id, &session_id).await?;
        debug!(user_id = %ctx.user_id, %session_id, removed, "Presence session closed");
        Ok(removed)
    }

    /// Masked presence of each target as seen by the caller.
    ///
    /// Reads only persisted snapshots; nothing is recomputed or written.
    pub async fn statuses(
        &self,
        ctx: &RequestContext,
        targets: &[Uuid],
    ) -> AppResult<HashMap<Uuid, MaskedPresence>> {
        if targets.len() > self.max_batch_size {
            return Err(AppError::validation(format!(
                "user_ids must contain at most {} ids",
                self.max_batch_size
            )));
        }
        let viewer = ctx.user_id;
        let now = ctx.request_time;

        let aggregates: HashMap<Uuid, _> = self
            .aggregates
            .find_many(targets)
            .await?
            .into_iter()
            .map(|a| (a.user_id, a))
            .collect();

        let others: Vec<Uuid> = targets.iter().copied().filter(|t| *t != viewer).collect();
        let privacy = self.privacy.resolve_many(&others).await?;

        let needs_context: Vec<Uuid> = others
            .iter()
            .copied()
            .filter(|t| privacy.get(t).is_some_and(|p| p.visibility == Visibility::Shared))
            .collect();
        let shared = self.shared_context.resolve(viewer, &needs_context).await?;

        let default_privacy = PrivacySettings::default();
        Ok(targets
            .iter()
            .map(|target| {
                let masked = self.masker.mask(
                    viewer,
                    *target,
                    aggregates.get(target),
                    privacy.get(target).unwrap_or(&default_privacy),
                    shared.get(target).copied().unwrap_or(false),
                    now,
                );
                (*target, masked)
            })
            .collect())
    }
}

/// Parse the comma-separated `user_ids` query parameter.
///
/// Blank entries are skipped and duplicates collapse onto their first
/// occurrence. An omitted or empty list means the caller alone.
pub fn parse_user_ids(raw: Option<&str>, caller: Uuid, max: usize) -> AppResult<Vec<Uuid>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for part in raw.unwrap_or_default().split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::validation(format!("Invalid user id: '{part}'")))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Ok(vec![caller]);
    }
    if ids.len() > max {
        return Err(AppError::validation(format!(
            "user_ids must contain at most {max} ids"
        )));
    }
    Ok(ids)
}
