//! Presence engine components.

pub mod aggregator;
pub mod janitor;
pub mod masker;
pub mod privacy;
pub mod recorder;
pub mod service;
pub mod shared_context;
pub mod staleness;

pub use aggregator::Aggregator;
pub use janitor::SessionJanitor;
pub use masker::VisibilityMasker;
pub use privacy::PrivacyResolver;
pub use recorder::{HeartbeatInput, SessionRecorder};
pub use service::{HeartbeatOutcome, PresenceService, parse_user_ids};
pub use shared_context::SharedContextResolver;
pub use staleness::StalenessEvaluator;
