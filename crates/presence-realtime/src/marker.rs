//! Presence change markers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use presence_cache::CacheManager;
use presence_cache::keys;
use presence_core::result::AppResult;
use presence_core::traits::cache::CacheProvider;
use presence_service::store::EventMarker;

use crate::bridge::memory_pubsub::MarkerBus;
use crate::bridge::redis_pubsub::RedisMarkerRelay;

/// "Something changed for this user." Carries no presence data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMarker {
    /// User whose presence changed.
    pub user_id: Uuid,
    /// Counter value after the bump.
    pub marker: i64,
}

/// [`EventMarker`] backed by a cache counter and the marker bus.
#[derive(Debug, Clone)]
pub struct CacheEventMarker {
    /// Counter storage.
    cache: Arc<CacheManager>,
    /// Local fan-out.
    bus: MarkerBus,
    /// Cross-node fan-out, when enabled.
    relay: Option<RedisMarkerRelay>,
}

impl CacheEventMarker {
    /// Creates a marker publishing on `bus` only.
    pub fn new(cache: Arc<CacheManager>, bus: MarkerBus) -> Self {
        Self {
            cache,
            bus,
            relay: None,
        }
    }

    /// Also publish every marker through `relay`.
    pub fn with_relay(mut self, relay: RedisMarkerRelay) -> Self {
        self.relay = Some(relay);
        self
    }
}

#[async_trait]
impl EventMarker for CacheEventMarker {
    async fn bump(&self, user_id: Uuid) -> AppResult<i64> {
        let value = self.cache.incr(&keys::presence_marker(user_id)).await?;
        let marker = PresenceMarker {
            user_id,
            marker: value,
        };

        self.bus.publish(marker);
        if let Some(relay) = &self.relay {
            if let Err(e) = relay.publish(&marker).await {
                warn!(%user_id, error = %e, "Presence marker relay failed");
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_core::config::cache::CacheConfig;

    #[tokio::test]
    async fn test_bump_increments_and_publishes() {
        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).await.unwrap());
        let bus = MarkerBus::new(8);
        let mut rx = bus.subscribe();
        let marker = CacheEventMarker::new(cache.clone(), bus);
        let user = Uuid::new_v4();

        assert_eq!(marker.bump(user).await.unwrap(), 1);
        assert_eq!(marker.bump(user).await.unwrap(), 2);

        assert_eq!(rx.recv().await.unwrap().marker, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second, PresenceMarker { user_id: user, marker: 2 });
        assert_eq!(
            cache.get(&keys::presence_marker(user)).await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_marker_serializes_without_presence_data() {
        let marker = PresenceMarker {
            user_id: Uuid::nil(),
            marker: 7,
        };
        let json = serde_json::to_value(marker).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(json["marker"], 7);
    }
}
