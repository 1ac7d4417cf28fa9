//! Presence domain entities.

pub mod aggregate;
pub mod session;
pub mod status;

pub use aggregate::{MaskedPresence, PresenceAggregate};
pub use session::{LEGACY_SESSION_ID, PresenceSession, UpsertPresenceSession};
pub use status::{HeartbeatSignal, PresenceStatus};
