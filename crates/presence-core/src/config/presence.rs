//! Presence engine tuning.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for the staleness windows: one year.
pub const MAX_WINDOW_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Upper bound for session retention: one hundred years.
pub const MAX_RETENTION_DAYS: u64 = 36_500;

/// Presence engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// How long a reported status is trusted at face value.
    #[serde(default = "default_online_window")]
    pub online_window_seconds: u64,
    /// Inactivity after which an online session reads as idle.
    /// Falls back to `online_window_seconds` when unset.
    #[serde(default)]
    pub idle_window_seconds: Option<u64>,
    /// Session rows whose `last_seen_at` is older than this are deleted
    /// during the owner's next heartbeat.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    /// Maximum number of user ids accepted by one status query.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Client session ids are truncated to this many characters.
    #[serde(default = "default_max_session_id_length")]
    pub max_session_id_length: usize,
    /// `last_page` values are truncated to this many characters.
    #[serde(default = "default_max_last_page_length")]
    pub max_last_page_length: usize,
    /// Client labels (User-Agent) are truncated to this many characters.
    #[serde(default = "default_max_client_label_length")]
    pub max_client_label_length: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            online_window_seconds: default_online_window(),
            idle_window_seconds: None,
            retention_days: default_retention_days(),
            max_batch_size: default_max_batch_size(),
            max_session_id_length: default_max_session_id_length(),
            max_last_page_length: default_max_last_page_length(),
            max_client_label_length: default_max_client_label_length(),
        }
    }
}

impl PresenceConfig {
    /// Reject values the engine cannot represent or act on.
    pub fn validate(&self) -> Result<(), AppError> {
        let window = |name: &str, seconds: u64| {
            if seconds == 0 || seconds > MAX_WINDOW_SECONDS {
                Err(AppError::configuration(format!(
                    "presence.{name} must be between 1 and {MAX_WINDOW_SECONDS}, got {seconds}"
                )))
            } else {
                Ok(())
            }
        };
        window("online_window_seconds", self.online_window_seconds)?;
        if let Some(idle) = self.idle_window_seconds {
            window("idle_window_seconds", idle)?;
        }

        if self.retention_days == 0 || self.retention_days > MAX_RETENTION_DAYS {
            return Err(AppError::configuration(format!(
                "presence.retention_days must be between 1 and {MAX_RETENTION_DAYS}, got {}",
                self.retention_days
            )));
        }
        if self.max_batch_size == 0 {
            return Err(AppError::configuration(
                "presence.max_batch_size must be at least 1",
            ));
        }
        Ok(())
    }

    /// Resolve the staleness windows.
    pub fn windows(&self) -> PresenceWindows {
        let online = self.online_window_seconds.min(MAX_WINDOW_SECONDS);
        let idle = self
            .idle_window_seconds
            .map_or(online, |idle| idle.min(MAX_WINDOW_SECONDS));
        PresenceWindows {
            online: Duration::seconds(online as i64),
            idle: Duration::seconds(idle as i64),
        }
    }

    /// The Janitor retention window.
    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days.min(MAX_RETENTION_DAYS) as i64)
    }
}

/// The two staleness thresholds used by the presence engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceWindows {
    /// Beyond this age a `last_seen_at` no longer counts as present.
    pub online: Duration,
    /// Beyond this age of inactivity an online session is shown as idle.
    pub idle: Duration,
}

impl PresenceWindows {
    /// Both windows set to the same duration.
    pub fn uniform(window: Duration) -> Self {
        Self {
            online: window,
            idle: window,
        }
    }
}

impl Default for PresenceWindows {
    fn default() -> Self {
        Self::uniform(Duration::seconds(default_online_window() as i64))
    }
}

fn default_online_window() -> u64 {
    300
}

fn default_retention_days() -> u64 {
    7
}

fn default_max_batch_size() -> usize {
    200
}

fn default_max_session_id_length() -> usize {
    128
}

fn default_max_last_page_length() -> usize {
    512
}

fn default_max_client_label_length() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PresenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cases = [
            PresenceConfig {
                online_window_seconds: 0,
                ..Default::default()
            },
            PresenceConfig {
                idle_window_seconds: Some(u64::MAX),
                ..Default::default()
            },
            PresenceConfig {
                retention_days: u64::MAX,
                ..Default::default()
            },
            PresenceConfig {
                max_batch_size: 0,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_durations_saturate_instead_of_panicking() {
        let config = PresenceConfig {
            online_window_seconds: u64::MAX,
            retention_days: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.windows().online.num_seconds(),
            MAX_WINDOW_SECONDS as i64
        );
        assert_eq!(config.retention().num_days(), MAX_RETENTION_DAYS as i64);
    }
}
