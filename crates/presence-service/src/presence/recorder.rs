//! Heartbeat normalization.

use serde::{Deserialize, Serialize};

use presence_core::config::presence::PresenceConfig;
use presence_entity::presence::{HeartbeatSignal, LEGACY_SESSION_ID, UpsertPresenceSession};

use crate::context::RequestContext;

/// A heartbeat exactly as the client sent it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatInput {
    /// Raw status signal.
    pub status: Option<String>,
    /// Page the client is on.
    pub last_page: Option<String>,
    /// Client-generated tab/device id.
    pub session_id: Option<String>,
}

/// Turns raw heartbeats into bounded session upserts.
#[derive(Debug, Clone, Copy)]
pub struct SessionRecorder {
    max_session_id_length: usize,
    max_last_page_length: usize,
    max_client_label_length: usize,
}

impl SessionRecorder {
    /// Creates a recorder using the truncation bounds of `config`.
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            max_session_id_length: config.max_session_id_length,
            max_last_page_length: config.max_last_page_length,
            max_client_label_length: config.max_client_label_length,
        }
    }

    /// Normalize one heartbeat from the caller of `ctx`.
    pub fn normalize(
        &self,
        ctx: &RequestContext,
        input: &HeartbeatInput,
    ) -> (HeartbeatSignal, UpsertPresenceSession) {
        let signal = HeartbeatSignal::parse_lenient(input.status.as_deref());
        let session_id = self
            .session_id(input.session_id.as_deref())
            .unwrap_or_else(|| LEGACY_SESSION_ID.to_string());

        let upsert = UpsertPresenceSession {
            user_id: ctx.user_id,
            session_id,
            reported_status: signal.reported_status(),
            seen_at: ctx.request_time,
            activity_at: signal
                .is_active_engagement()
                .then_some(ctx.request_time),
            last_page: bounded(input.last_page.as_deref(), self.max_last_page_length),
            client_label: bounded(ctx.user_agent.as_deref(), self.max_client_label_length),
        };
        (signal, upsert)
    }

    /// Trimmed and truncated session id, or `None` when blank or absent.
    pub fn session_id(&self, raw: Option<&str>) -> Option<String> {
        bounded(raw, self.max_session_id_length)
    }
}

/// Trim, drop if empty, and cut to at most `max` characters.
fn bounded(raw: Option<&str>, max: usize) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use presence_entity::presence::PresenceStatus;
    use uuid::Uuid;

    fn recorder() -> SessionRecorder {
        SessionRecorder::new(&PresenceConfig {
            max_session_id_length: 8,
            max_last_page_length: 5,
            max_client_label_length: 4,
            ..PresenceConfig::default()
        })
    }

    #[test]
    fn test_missing_session_id_uses_legacy_placeholder() {
        let ctx = RequestContext::new(Uuid::new_v4(), None);
        for session_id in [None, Some("   ".to_string())] {
            let input = HeartbeatInput {
                session_id,
                ..HeartbeatInput::default()
            };
            let (_, upsert) = recorder().normalize(&ctx, &input);
            assert_eq!(upsert.session_id, LEGACY_SESSION_ID);
        }
    }

    #[test]
    fn test_fields_are_truncated() {
        let ctx = RequestContext::new(Uuid::new_v4(), Some("Mozilla/5.0".to_string()));
        let input = HeartbeatInput {
            status: Some("online".to_string()),
            last_page: Some("/chat/123".to_string()),
            session_id: Some("tab-0123456789".to_string()),
        };
        let (_, upsert) = recorder().normalize(&ctx, &input);
        assert_eq!(upsert.session_id, "tab-0123");
        assert_eq!(upsert.last_page.as_deref(), Some("/chat"));
        assert_eq!(upsert.client_label.as_deref(), Some("Mozi"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(bounded(Some("héllo"), 2).as_deref(), Some("hé"));
    }

    #[test]
    fn test_activity_stamped_only_for_engagement() {
        let now = Utc::now();
        let ctx = RequestContext::at(Uuid::new_v4(), None, now);

        let typing = HeartbeatInput {
            status: Some("typing".to_string()),
            ..HeartbeatInput::default()
        };
        let (signal, upsert) = recorder().normalize(&ctx, &typing);
        assert_eq!(signal, HeartbeatSignal::Typing);
        assert_eq!(upsert.reported_status, PresenceStatus::Online);
        assert_eq!(upsert.activity_at, Some(now));

        let idle = HeartbeatInput {
            status: Some("idle".to_string()),
            ..HeartbeatInput::default()
        };
        let (_, upsert) = recorder().normalize(&ctx, &idle);
        assert_eq!(upsert.reported_status, PresenceStatus::Idle);
        assert_eq!(upsert.activity_at, None);
        assert_eq!(upsert.seen_at, now);
    }

    #[test]
    fn test_unknown_status_defaults_to_online() {
        let ctx = RequestContext::new(Uuid::new_v4(), None);
        let input = HeartbeatInput {
            status: Some("dnd".to_string()),
            ..HeartbeatInput::default()
        };
        let (signal, upsert) = recorder().normalize(&ctx, &input);
        assert_eq!(signal, HeartbeatSignal::Online);
        assert!(upsert.activity_at.is_some());
    }
}
