//! In-memory marker bus for a single node.

use tokio::sync::broadcast;

use crate::marker::PresenceMarker;

/// Fan-out of presence markers to every local subscriber.
#[derive(Debug, Clone)]
pub struct MarkerBus {
    /// Broadcast sender; receivers are created per subscriber.
    tx: broadcast::Sender<PresenceMarker>,
}

impl MarkerBus {
    /// Create a new bus holding up to `buffer_size` undelivered markers
    /// per subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self { tx }
    }

    /// Publish a marker. Returns the number of subscribers reached.
    pub fn publish(&self, marker: PresenceMarker) -> usize {
        // No subscribers is not an error.
        self.tx.send(marker).unwrap_or(0)
    }

    /// Subscribe to all future markers.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceMarker> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
