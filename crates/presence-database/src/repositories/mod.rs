//! Repository implementations for presence data and the collaborator
//! tables it reads.

pub mod aggregate;
pub mod membership;
pub mod profile;
pub mod session;

pub use aggregate::PresenceAggregateRepository;
pub use membership::GroupMembershipRepository;
pub use profile::ProfileSettingsRepository;
pub use session::PresenceSessionRepository;
