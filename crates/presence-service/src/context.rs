//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer and passed into service methods so that every
/// operation knows *who* is acting and *when*. `request_time` is the single
/// "now" used for every timestamp and staleness decision of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current wall clock.
    pub fn new(user_id: Uuid, user_agent: Option<String>) -> Self {
        Self::at(user_id, user_agent, Utc::now())
    }

    /// Creates a request context for an explicit point in time.
    pub fn at(user_id: Uuid, user_agent: Option<String>, request_time: DateTime<Utc>) -> Self {
        Self {
            user_id,
            user_agent,
            request_time,
        }
    }
}
