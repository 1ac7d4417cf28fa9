//! Redis pub/sub relay for multi-node deployments.

use tokio::sync::watch;

/// Whether the relay should stop once `changed()` has resolved.
/// A dropped sender can never signal again, so it counts as a stop.
#[cfg_attr(not(feature = "redis-pubsub"), allow(dead_code))]
fn stop_requested(
    changed: Result<(), watch::error::RecvError>,
    shutdown: &watch::Receiver<bool>,
) -> bool {
    changed.is_err() || *shutdown.borrow()
}

#[cfg(feature = "redis-pubsub")]
pub mod implementation {
    use futures::StreamExt;
    use serde::{Deserialize, Serialize};
    use tokio::sync::watch;
    use tracing::{debug, error, info, warn};
    use uuid::Uuid;

    use presence_cache::redis::RedisClient;
    use presence_core::error::{AppError, ErrorKind};
    use presence_core::result::AppResult;

    use crate::bridge::memory_pubsub::MarkerBus;
    use crate::marker::PresenceMarker;

    /// Marker as sent over Redis, tagged with the publishing node.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct RelayEnvelope {
        node: Uuid,
        #[serde(flatten)]
        marker: PresenceMarker,
    }

    /// Relays markers between nodes through one Redis channel.
    #[derive(Debug, Clone)]
    pub struct RedisMarkerRelay {
        /// Shared Redis client.
        client: RedisClient,
        /// Channel name.
        channel: String,
        /// Identity of this node, used to skip its own markers.
        node: Uuid,
    }

    impl RedisMarkerRelay {
        /// Creates a relay on `channel`.
        pub fn new(client: RedisClient, channel: &str) -> Self {
            Self {
                client,
                channel: channel.to_string(),
                node: Uuid::new_v4(),
            }
        }

        /// Publishes a marker to the other nodes.
        pub async fn publish(&self, marker: &PresenceMarker) -> AppResult<()> {
            let payload = serde_json::to_string(&RelayEnvelope {
                node: self.node,
                marker: *marker,
            })?;
            let mut conn = self.client.conn_mut();
            redis::cmd("PUBLISH")
                .arg(&self.channel)
                .arg(payload)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Cache, "Redis PUBLISH failed", e)
                })?;
            Ok(())
        }

        /// Forwards markers published by other nodes into the local bus
        /// until `shutdown` flips to `true`.
        pub async fn run(&self, bus: MarkerBus, mut shutdown: watch::Receiver<bool>) -> AppResult<()> {
            let mut pubsub = self.client.client().get_async_pubsub().await.map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Failed to open Redis pub/sub", e)
            })?;
            pubsub.subscribe(&self.channel).await.map_err(|e| {
                AppError::with_source(ErrorKind::Cache, "Redis SUBSCRIBE failed", e)
            })?;
            info!(channel = %self.channel, "Presence marker relay subscribed");

            let mut messages = pubsub.on_message();
            loop {
                tokio::select! {
                    msg = messages.next() => {
                        let Some(msg) = msg else {
                            error!(channel = %self.channel, "Redis pub/sub stream ended");
                            return Err(AppError::service_unavailable("Redis pub/sub stream ended"));
                        };
                        let payload: String = match msg.get_payload() {
                            Ok(p) => p,
                            Err(e) => {
                                warn!(error = %e, "Unreadable presence marker payload");
                                continue;
                            }
                        };
                        self.forward(&bus, &payload);
                    }
                    changed = shutdown.changed() => {
                        if super::stop_requested(changed, &shutdown) {
                            info!("Presence marker relay stopping");
                            return Ok(());
                        }
                    }
                }
            }
        }

        fn forward(&self, bus: &MarkerBus, payload: &str) {
            match serde_json::from_str::<RelayEnvelope>(payload) {
                Ok(envelope) if envelope.node == self.node => {}
                Ok(envelope) => {
                    let reached = bus.publish(envelope.marker);
                    debug!(user_id = %envelope.marker.user_id, reached, "Relayed presence marker");
                }
                Err(e) => warn!(error = %e, "Malformed presence marker payload"),
            }
        }
    }
}

#[cfg(not(feature = "redis-pubsub"))]
pub mod implementation {
    use tokio::sync::watch;

    use presence_core::error::AppError;
    use presence_core::result::AppResult;

    use crate::bridge::memory_pubsub::MarkerBus;
    use crate::marker::PresenceMarker;

    /// Relay placeholder when the `redis-pubsub` feature is disabled.
    #[derive(Debug, Clone)]
    pub struct RedisMarkerRelay;

    impl RedisMarkerRelay {
        /// Always fails: markers stay on the local node.
        pub async fn publish(&self, _marker: &PresenceMarker) -> AppResult<()> {
            Err(AppError::configuration(
                "Redis marker relay requires the redis-pubsub feature",
            ))
        }

        /// Always fails: markers stay on the local node.
        pub async fn run(&self, _bus: MarkerBus, _shutdown: watch::Receiver<bool>) -> AppResult<()> {
            Err(AppError::configuration(
                "Redis marker relay requires the redis-pubsub feature",
            ))
        }
    }
}

pub use implementation::RedisMarkerRelay;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_sender_stops_the_relay() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let changed = rx.changed().await;
        assert!(stop_requested(changed, &rx));
    }

    #[tokio::test]
    async fn test_only_a_true_signal_stops_the_relay() {
        let (tx, mut rx) = watch::channel(false);

        tx.send(false).unwrap();
        let changed = rx.changed().await;
        assert!(!stop_requested(changed, &rx));

        tx.send(true).unwrap();
        let changed = rx.changed().await;
        assert!(stop_requested(changed, &rx));
    }
}
