//! # presence-entity
//!
//! Domain entity models for the presence engine. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod presence;
pub mod privacy;

pub use presence::{
    HeartbeatSignal, LEGACY_SESSION_ID, MaskedPresence, PresenceAggregate, PresenceSession,
    PresenceStatus, UpsertPresenceSession,
};
pub use privacy::{PrivacySettings, Visibility};
