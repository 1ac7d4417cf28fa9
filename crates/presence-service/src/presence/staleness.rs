//! Staleness classification of a reported status.

use chrono::{DateTime, Utc};

use presence_core::config::presence::PresenceWindows;
use presence_entity::presence::PresenceStatus;

/// Maps `{status, last_seen_at, last_activity_at}` at a given instant to
/// the status that evidence still justifies.
///
/// Level-triggered: the result depends only on the inputs, never on a
/// previous evaluation.
#[derive(Debug, Clone, Copy)]
pub struct StalenessEvaluator {
    windows: PresenceWindows,
}

impl StalenessEvaluator {
    /// Creates an evaluator for the given windows.
    pub fn new(windows: PresenceWindows) -> Self {
        Self { windows }
    }

    /// The configured windows.
    pub fn windows(&self) -> PresenceWindows {
        self.windows
    }

    /// Classify one status triple at `now`.
    ///
    /// Timestamps in the future of `now` count as zero age.
    pub fn evaluate(
        &self,
        status: PresenceStatus,
        last_seen_at: Option<DateTime<Utc>>,
        last_activity_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> PresenceStatus {
        let Some(seen) = last_seen_at else {
            return PresenceStatus::Offline;
        };
        if now - seen > self.windows.online {
            return PresenceStatus::Offline;
        }
        // Degraded sessions show as idle until the full window has elapsed.
        if status != PresenceStatus::Online {
            return PresenceStatus::Idle;
        }
        let activity = last_activity_at.unwrap_or(seen);
        if now - activity > self.windows.idle {
            PresenceStatus::Idle
        } else {
            PresenceStatus::Online
        }
    }

    /// Whether `seen` is within the online window at `now`.
    pub fn is_recent(&self, seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - seen <= self.windows.online
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn evaluator() -> StalenessEvaluator {
        StalenessEvaluator::new(PresenceWindows::uniform(Duration::minutes(5)))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_seen_is_offline() {
        let e = evaluator();
        assert_eq!(
            e.evaluate(PresenceStatus::Online, None, Some(t0()), t0()),
            PresenceStatus::Offline
        );
    }

    #[test]
    fn test_beyond_online_window_is_offline() {
        let e = evaluator();
        let now = t0() + Duration::minutes(5) + Duration::seconds(1);
        for status in [PresenceStatus::Online, PresenceStatus::Idle] {
            assert_eq!(
                e.evaluate(status, Some(t0()), Some(t0()), now),
                PresenceStatus::Offline
            );
        }
    }

    #[test]
    fn test_exactly_at_window_is_still_present() {
        let e = evaluator();
        let now = t0() + Duration::minutes(5);
        assert_eq!(
            e.evaluate(PresenceStatus::Online, Some(t0()), None, now),
            PresenceStatus::Online
        );
    }

    #[test]
    fn test_degraded_status_reads_as_idle() {
        let e = evaluator();
        let now = t0() + Duration::seconds(10);
        assert_eq!(
            e.evaluate(PresenceStatus::Idle, Some(t0()), None, now),
            PresenceStatus::Idle
        );
        assert_eq!(
            e.evaluate(PresenceStatus::Offline, Some(t0()), None, now),
            PresenceStatus::Idle
        );
    }

    #[test]
    fn test_online_without_recent_activity_reads_as_idle() {
        let e = StalenessEvaluator::new(PresenceWindows {
            online: Duration::minutes(5),
            idle: Duration::minutes(1),
        });
        let seen = t0() + Duration::minutes(3);
        let now = t0() + Duration::minutes(4);
        assert_eq!(
            e.evaluate(PresenceStatus::Online, Some(seen), Some(t0()), now),
            PresenceStatus::Idle
        );
        assert_eq!(
            e.evaluate(PresenceStatus::Online, Some(seen), Some(seen), now),
            PresenceStatus::Online
        );
    }

    #[test]
    fn test_future_timestamps_count_as_fresh() {
        let e = evaluator();
        let seen = t0() + Duration::minutes(1);
        assert_eq!(
            e.evaluate(PresenceStatus::Online, Some(seen), None, t0()),
            PresenceStatus::Online
        );
    }

    #[test]
    fn test_decay_is_monotonic() {
        let e = StalenessEvaluator::new(PresenceWindows {
            online: Duration::minutes(5),
            idle: Duration::minutes(2),
        });
        for status in [
            PresenceStatus::Online,
            PresenceStatus::Idle,
            PresenceStatus::Offline,
        ] {
            let mut previous = u8::MAX;
            for second in 0..=600 {
                let now = t0() + Duration::seconds(second);
                let rank = e.evaluate(status, Some(t0()), Some(t0()), now).rank();
                assert!(rank <= previous, "status rose at t0+{second}s");
                previous = rank;
            }
        }
    }
}
