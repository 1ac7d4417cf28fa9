//! Transports carrying presence markers to subscribers.

pub mod memory_pubsub;
pub mod redis_pubsub;

pub use redis_pubsub::RedisMarkerRelay;
