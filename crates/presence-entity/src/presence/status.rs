//! Presence status and heartbeat signal vocabularies.

use serde::{Deserialize, Serialize};

/// Canonical presence status of a user or of one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "presence_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Present and recently active.
    Online,
    /// Present but not recently active.
    Idle,
    /// Not present.
    Offline,
}

impl PresenceStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Offline => "offline",
        }
    }

    /// Rank used to compare how "present" a status is.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Online => 2,
            Self::Idle => 1,
            Self::Offline => 0,
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = presence_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "offline" => Ok(Self::Offline),
            _ => Err(presence_core::AppError::validation(format!(
                "Invalid presence status: '{s}'"
            ))),
        }
    }
}

/// Raw status signal sent by a client with each heartbeat.
///
/// `typing` and `read` are transient flavors of `online`: they fold into
/// [`PresenceStatus::Online`] and count as active engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartbeatSignal {
    /// The tab is open and the user is engaged.
    Online,
    /// The tab is open but the user has gone quiet.
    Idle,
    /// The client reports itself as offline (e.g. the user chose invisible).
    Offline,
    /// The user is composing a message.
    Typing,
    /// The user just read a conversation.
    Read,
}

impl HeartbeatSignal {
    /// Parse a client-supplied signal. Missing or unrecognized values
    /// default to [`HeartbeatSignal::Online`].
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("idle") => Self::Idle,
            Some("offline") => Self::Offline,
            Some("typing") => Self::Typing,
            Some("read") => Self::Read,
            _ => Self::Online,
        }
    }

    /// The status stored on the session row for this signal.
    pub fn reported_status(&self) -> PresenceStatus {
        match self {
            Self::Online | Self::Typing | Self::Read => PresenceStatus::Online,
            Self::Idle => PresenceStatus::Idle,
            Self::Offline => PresenceStatus::Offline,
        }
    }

    /// Whether this signal proves the user is actively engaged right now.
    pub fn is_active_engagement(&self) -> bool {
        matches!(self, Self::Online | Self::Typing | Self::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_signal_defaults_to_online() {
        assert_eq!(HeartbeatSignal::parse_lenient(None), HeartbeatSignal::Online);
        assert_eq!(
            HeartbeatSignal::parse_lenient(Some("away")),
            HeartbeatSignal::Online
        );
        assert_eq!(
            HeartbeatSignal::parse_lenient(Some(" IDLE ")),
            HeartbeatSignal::Idle
        );
    }

    #[test]
    fn test_transient_signals_fold_into_online() {
        for signal in [HeartbeatSignal::Typing, HeartbeatSignal::Read] {
            assert_eq!(signal.reported_status(), PresenceStatus::Online);
            assert!(signal.is_active_engagement());
        }
        assert!(!HeartbeatSignal::Idle.is_active_engagement());
        assert!(!HeartbeatSignal::Offline.is_active_engagement());
        assert_eq!(
            HeartbeatSignal::Offline.reported_status(),
            PresenceStatus::Offline
        );
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Online".parse::<PresenceStatus>().unwrap(), PresenceStatus::Online);
        assert!("typing".parse::<PresenceStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&PresenceStatus::Idle).unwrap();
        assert_eq!(json, "\"idle\"");
    }
}
