//! # presence-service
//!
//! The presence engine. Each component is a small unit with its
//! dependencies injected at construction time via `Arc` references:
//!
//! - [`StalenessEvaluator`]: pure `{status, last_seen, last_activity, now}` classification
//! - [`Aggregator`]: folds a user's session rows into one snapshot
//! - [`SessionRecorder`]: normalizes heartbeats into session upserts
//! - [`SessionJanitor`]: inline retention sweep of the caller's own rows
//! - [`PrivacyResolver`], [`SharedContextResolver`], [`VisibilityMasker`]:
//!   the read-side projection of presence for a given viewer
//!
//! [`PresenceService`] orchestrates them over the stores in [`store`].

pub mod context;
pub mod presence;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::RequestContext;
pub use presence::{
    Aggregator, HeartbeatInput, HeartbeatOutcome, PresenceService, PrivacyResolver,
    SessionJanitor, SessionRecorder, SharedContextResolver, StalenessEvaluator, VisibilityMasker,
    parse_user_ids,
};
pub use store::{
    AggregateStore, EventMarker, MembershipSource, PresenceStores, ProfileSettingsSource,
    SessionStore,
};
