//! Per-viewer projection of presence.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use presence_entity::presence::{MaskedPresence, PresenceAggregate};
use presence_entity::privacy::{PrivacySettings, Visibility};

use super::staleness::StalenessEvaluator;

/// Projects a stored snapshot into what one viewer may observe.
///
/// A denied target is indistinguishable from one that is offline and has
/// never been seen.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityMasker {
    evaluator: StalenessEvaluator,
}

impl VisibilityMasker {
    /// Creates a masker that re-evaluates stored snapshots through `evaluator`.
    pub fn new(evaluator: StalenessEvaluator) -> Self {
        Self { evaluator }
    }

    /// Mask `aggregate` (the stored snapshot of `target`, if any) for `viewer`.
    pub fn mask(
        &self,
        viewer: Uuid,
        target: Uuid,
        aggregate: Option<&PresenceAggregate>,
        privacy: &PrivacySettings,
        shared_context: bool,
        now: DateTime<Utc>,
    ) -> MaskedPresence {
        let Some(aggregate) = aggregate else {
            return MaskedPresence::hidden();
        };
        let live = self.evaluator.evaluate(
            aggregate.status,
            aggregate.last_seen_at,
            aggregate.last_activity_at,
            now,
        );

        if viewer == target {
            return MaskedPresence {
                status: live,
                last_seen_at: aggregate.last_seen_at,
            };
        }

        let allowed = match privacy.visibility {
            Visibility::Everyone => true,
            Visibility::Shared => shared_context,
            Visibility::Nobody => false,
        };
        if !privacy.show_status || !allowed {
            return MaskedPresence::hidden();
        }

        MaskedPresence {
            status: live,
            last_seen_at: privacy
                .show_last_seen
                .then_some(aggregate.last_seen_at)
                .flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use presence_core::config::presence::PresenceWindows;
    use presence_entity::presence::PresenceStatus;

    fn masker() -> VisibilityMasker {
        VisibilityMasker::new(StalenessEvaluator::new(PresenceWindows::uniform(
            Duration::minutes(5),
        )))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn online_at(user_id: Uuid, at: DateTime<Utc>) -> PresenceAggregate {
        PresenceAggregate {
            user_id,
            status: PresenceStatus::Online,
            last_seen_at: Some(at),
            last_activity_at: Some(at),
            updated_at: at,
        }
    }

    fn privacy(show_status: bool, show_last_seen: bool, visibility: Visibility) -> PrivacySettings {
        PrivacySettings {
            show_status,
            show_last_seen,
            visibility,
        }
    }

    #[test]
    fn test_nobody_always_masks_fully() {
        let (viewer, target) = (Uuid::new_v4(), Uuid::new_v4());
        let agg = online_at(target, t0());
        for shared in [true, false] {
            for show in [true, false] {
                let masked = masker().mask(
                    viewer,
                    target,
                    Some(&agg),
                    &privacy(show, show, Visibility::Nobody),
                    shared,
                    t0(),
                );
                assert_eq!(masked, MaskedPresence::hidden());
            }
        }
    }

    #[test]
    fn test_self_view_ignores_privacy_and_recomputes() {
        let me = Uuid::new_v4();
        let agg = online_at(me, t0());
        let hidden = privacy(false, false, Visibility::Nobody);

        let fresh = masker().mask(me, me, Some(&agg), &hidden, false, t0() + Duration::seconds(30));
        assert_eq!(fresh.status, PresenceStatus::Online);
        assert_eq!(fresh.last_seen_at, Some(t0()));

        let later = masker().mask(me, me, Some(&agg), &hidden, false, t0() + Duration::minutes(6));
        assert_eq!(later.status, PresenceStatus::Offline);
        assert_eq!(later.last_seen_at, Some(t0()));
    }

    #[test]
    fn test_shared_visibility_requires_common_group() {
        let (viewer, target) = (Uuid::new_v4(), Uuid::new_v4());
        let agg = online_at(target, t0());
        let settings = privacy(true, true, Visibility::Shared);

        let peer = masker().mask(viewer, target, Some(&agg), &settings, true, t0());
        assert_eq!(
            peer,
            MaskedPresence {
                status: PresenceStatus::Online,
                last_seen_at: Some(t0()),
            }
        );

        let stranger = masker().mask(viewer, target, Some(&agg), &settings, false, t0());
        assert_eq!(stranger, MaskedPresence::hidden());
    }

    #[test]
    fn test_hidden_status_and_hidden_last_seen() {
        let (viewer, target) = (Uuid::new_v4(), Uuid::new_v4());
        let agg = online_at(target, t0());

        let no_status = masker().mask(
            viewer,
            target,
            Some(&agg),
            &privacy(false, true, Visibility::Everyone),
            true,
            t0(),
        );
        assert_eq!(no_status, MaskedPresence::hidden());

        let no_last_seen = masker().mask(
            viewer,
            target,
            Some(&agg),
            &privacy(true, false, Visibility::Everyone),
            false,
            t0(),
        );
        assert_eq!(no_last_seen.status, PresenceStatus::Online);
        assert_eq!(no_last_seen.last_seen_at, None);
    }

    #[test]
    fn test_stored_status_is_decayed_for_viewers() {
        let (viewer, target) = (Uuid::new_v4(), Uuid::new_v4());
        let agg = online_at(target, t0());
        let masked = masker().mask(
            viewer,
            target,
            Some(&agg),
            &PrivacySettings::default(),
            false,
            t0() + Duration::minutes(6),
        );
        assert_eq!(masked.status, PresenceStatus::Offline);
        assert_eq!(masked.last_seen_at, Some(t0()));
    }

    #[test]
    fn test_missing_aggregate_is_hidden() {
        let me = Uuid::new_v4();
        let masked = masker().mask(me, me, None, &PrivacySettings::default(), true, t0());
        assert_eq!(masked, MaskedPresence::hidden());
    }
}
