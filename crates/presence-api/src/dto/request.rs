//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_service::HeartbeatInput;

/// `POST /presence/heartbeat` body.
///
/// Every field is optional; the presence engine normalizes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Raw status signal (`online`, `idle`, `offline`, `typing`, `read`).
    #[serde(default)]
    pub status: Option<String>,
    /// Page the client is on.
    #[serde(default)]
    pub last_page: Option<String>,
    /// Client-generated tab/device id.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl HeartbeatRequest {
    /// Parse a heartbeat body.
    ///
    /// Like the close signal, the body is read as JSON whatever its content
    /// type. An empty body is a bare heartbeat. Fields of the wrong type are
    /// ignored, so an unrecognized `status` falls back to `online`.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid heartbeat body: {e}")))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(AppError::validation("Heartbeat body must be a JSON object"));
        }

        let field = |name: &str| value.get(name).and_then(Value::as_str).map(String::from);
        Ok(Self {
            status: field("status"),
            last_page: field("last_page"),
            session_id: field("session_id"),
        })
    }
}

impl From<HeartbeatRequest> for HeartbeatInput {
    fn from(req: HeartbeatRequest) -> Self {
        Self {
            status: req.status,
            last_page: req.last_page,
            session_id: req.session_id,
        }
    }
}

/// `POST /presence/session/close` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloseSessionRequest {
    /// Session to delete.
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
}

impl CloseSessionRequest {
    /// Parse a close signal.
    ///
    /// Page-teardown beacons often arrive as `text/plain`, so the body is
    /// read as JSON regardless of its content type.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        let req: Self = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid close request body: {e}")))?;
        req.validate()
            .map_err(|e| AppError::validation(format!("Invalid close request: {e}")))?;
        Ok(req)
    }
}

/// `GET /presence/status` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusQuery {
    /// Comma-separated user ids; defaults to the caller.
    #[serde(default)]
    pub user_ids: Option<String>,
}

/// `GET /presence/ws` query. Browsers cannot set headers on WebSocket
/// upgrades, so the token may travel in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_body_ignores_mistyped_fields() {
        let req = HeartbeatRequest::from_body(br#"{"status":5,"last_page":"/a","session_id":7}"#)
            .unwrap();
        assert_eq!(req.status, None);
        assert_eq!(req.last_page.as_deref(), Some("/a"));
        assert_eq!(req.session_id, None);
    }

    #[test]
    fn test_heartbeat_body_may_be_empty() {
        assert!(HeartbeatRequest::from_body(b"").unwrap().status.is_none());
        assert!(HeartbeatRequest::from_body(b"null").unwrap().session_id.is_none());
        assert!(HeartbeatRequest::from_body(b"[1]").is_err());
        assert!(HeartbeatRequest::from_body(b"{oops").is_err());
    }

    #[test]
    fn test_close_body_parses_without_content_type() {
        let req = CloseSessionRequest::from_body(br#"{"session_id":"tab-1"}"#).unwrap();
        assert_eq!(req.session_id, "tab-1");
    }

    #[test]
    fn test_close_body_requires_session_id() {
        assert!(CloseSessionRequest::from_body(br#"{"session_id":""}"#).is_err());
        assert!(CloseSessionRequest::from_body(br#"{}"#).is_err());
        assert!(CloseSessionRequest::from_body(b"not json").is_err());
    }
}
