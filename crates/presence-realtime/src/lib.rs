//! # presence-realtime
//!
//! Change-marker fan-out for the presence engine. A heartbeat bumps the
//! caller's marker counter in the cache and publishes an opaque
//! [`PresenceMarker`] to subscribers, who then re-fetch the masked status
//! through the HTTP API. Presence payloads are never broadcast.
//!
//! - In-process fan-out over a tokio broadcast channel
//! - Multi-node relay via Redis pub/sub (feature `redis-pubsub`)

pub mod bridge;
pub mod marker;

pub use bridge::memory_pubsub::MarkerBus;
pub use marker::{CacheEventMarker, PresenceMarker};
