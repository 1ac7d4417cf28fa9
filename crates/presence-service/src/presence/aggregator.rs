//! Folds a user's session rows into one presence snapshot.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use presence_entity::presence::{PresenceAggregate, PresenceSession, PresenceStatus};

use super::staleness::StalenessEvaluator;

/// Derives the canonical per-user snapshot from the full session set.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    evaluator: StalenessEvaluator,
}

impl Aggregator {
    /// Creates an aggregator that decays through `evaluator`.
    pub fn new(evaluator: StalenessEvaluator) -> Self {
        Self { evaluator }
    }

    /// Compute the snapshot of `user_id` from all of its current sessions.
    ///
    /// The result depends only on the set of rows and `now`, not on their
    /// order.
    pub fn aggregate(
        &self,
        user_id: Uuid,
        sessions: &[PresenceSession],
        now: DateTime<Utc>,
    ) -> PresenceAggregate {
        if sessions.is_empty() {
            return PresenceAggregate::offline(user_id, now);
        }

        let last_seen_at = sessions.iter().map(|s| s.last_seen_at).max();
        let last_activity_at = sessions.iter().map(PresenceSession::activity_or_seen).max();

        let recent_with = |status: PresenceStatus| {
            sessions.iter().any(|s| {
                s.reported_status == status && self.evaluator.is_recent(s.last_seen_at, now)
            })
        };
        let raw = if recent_with(PresenceStatus::Online) {
            PresenceStatus::Online
        } else if recent_with(PresenceStatus::Idle) {
            PresenceStatus::Idle
        } else {
            PresenceStatus::Offline
        };

        PresenceAggregate {
            user_id,
            status: self
                .evaluator
                .evaluate(raw, last_seen_at, last_activity_at, now),
            last_seen_at,
            last_activity_at,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use presence_core::config::presence::PresenceWindows;

    fn aggregator() -> Aggregator {
        Aggregator::new(StalenessEvaluator::new(PresenceWindows::uniform(
            Duration::minutes(5),
        )))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn session(
        user_id: Uuid,
        id: &str,
        status: PresenceStatus,
        seen: DateTime<Utc>,
        activity: Option<DateTime<Utc>>,
    ) -> PresenceSession {
        PresenceSession {
            user_id,
            session_id: id.to_string(),
            reported_status: status,
            last_seen_at: seen,
            last_activity_at: activity,
            last_page: None,
            client_label: None,
            updated_at: seen,
        }
    }

    #[test]
    fn test_no_sessions_is_offline() {
        let user = Uuid::new_v4();
        let agg = aggregator().aggregate(user, &[], t0());
        assert_eq!(agg.status, PresenceStatus::Offline);
        assert_eq!(agg.last_seen_at, None);
        assert_eq!(agg.last_activity_at, None);
    }

    #[test]
    fn test_recent_online_session_wins_over_newer_idle_one() {
        let user = Uuid::new_v4();
        let now = t0() + Duration::minutes(2);
        let sessions = [
            session(user, "a", PresenceStatus::Online, t0(), Some(t0())),
            session(user, "b", PresenceStatus::Idle, now, None),
        ];

        let agg = aggregator().aggregate(user, &sessions, now);
        assert_eq!(agg.status, PresenceStatus::Online);
        assert_eq!(agg.last_seen_at, Some(now));
        assert_eq!(agg.last_activity_at, Some(now));
    }

    #[test]
    fn test_only_idle_sessions_yield_idle() {
        let user = Uuid::new_v4();
        let now = t0() + Duration::minutes(1);
        let sessions = [session(user, "a", PresenceStatus::Idle, t0(), None)];
        assert_eq!(
            aggregator().aggregate(user, &sessions, now).status,
            PresenceStatus::Idle
        );
    }

    #[test]
    fn test_offline_report_within_window_shows_idle() {
        let user = Uuid::new_v4();
        let sessions = [session(user, "a", PresenceStatus::Offline, t0(), None)];
        assert_eq!(
            aggregator().aggregate(user, &sessions, t0()).status,
            PresenceStatus::Idle
        );
    }

    #[test]
    fn test_stale_online_session_does_not_count() {
        let user = Uuid::new_v4();
        let now = t0() + Duration::minutes(7);
        let sessions = [
            session(user, "old", PresenceStatus::Online, t0(), Some(t0())),
            session(user, "new", PresenceStatus::Idle, now - Duration::minutes(1), None),
        ];
        let agg = aggregator().aggregate(user, &sessions, now);
        assert_eq!(agg.status, PresenceStatus::Idle);
        assert_eq!(agg.last_seen_at, Some(now - Duration::minutes(1)));
    }

    #[test]
    fn test_all_sessions_stale_is_offline_with_timestamps() {
        let user = Uuid::new_v4();
        let now = t0() + Duration::minutes(6);
        let sessions = [session(user, "a", PresenceStatus::Online, t0(), Some(t0()))];
        let agg = aggregator().aggregate(user, &sessions, now);
        assert_eq!(agg.status, PresenceStatus::Offline);
        assert_eq!(agg.last_seen_at, Some(t0()));
    }

    #[test]
    fn test_result_independent_of_row_order() {
        let user = Uuid::new_v4();
        let now = t0() + Duration::minutes(3);
        let a = session(user, "a", PresenceStatus::Online, t0(), Some(t0()));
        let b = session(user, "b", PresenceStatus::Idle, t0() + Duration::minutes(2), None);
        let c = session(
            user,
            "c",
            PresenceStatus::Offline,
            t0() + Duration::minutes(1),
            Some(t0() - Duration::minutes(10)),
        );

        let agg = aggregator();
        let expected = agg.aggregate(user, &[a.clone(), b.clone(), c.clone()], now);
        for order in [
            vec![a.clone(), c.clone(), b.clone()],
            vec![b.clone(), a.clone(), c.clone()],
            vec![b.clone(), c.clone(), a.clone()],
            vec![c.clone(), a.clone(), b.clone()],
            vec![c.clone(), b.clone(), a.clone()],
        ] {
            assert_eq!(agg.aggregate(user, &order, now), expected);
        }
    }
}
