//! Change-marker fan-out configuration.

use serde::{Deserialize, Serialize};

/// Settings for distributing presence change markers to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size of the in-process marker broadcast channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Also relay markers through Redis `PUBLISH` for multi-node deployments.
    #[serde(default)]
    pub redis_pubsub: bool,
    /// Redis channel markers are published on.
    #[serde(default = "default_marker_channel")]
    pub marker_channel: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            redis_pubsub: false,
            marker_channel: default_marker_channel(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_marker_channel() -> String {
    "presence:markers".to_string()
}
