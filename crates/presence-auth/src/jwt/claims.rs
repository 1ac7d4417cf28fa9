//! JWT claims structure carried by access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims payload embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID for blocklist tracking.
    pub jti: Uuid,
    /// Token type. Tokens without the claim are treated as access tokens.
    #[serde(default)]
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    #[default]
    Access,
    /// Long-lived refresh token. Never accepted by presence endpoints.
    Refresh,
}

impl Claims {
    /// Build access-token claims for `user_id` valid for `ttl_seconds`.
    pub fn access(user_id: Uuid, now: DateTime<Utc>, ttl_seconds: i64) -> Self {
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        }
    }

    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_type_defaults_to_access() {
        let json = format!(
            r#"{{"sub":"{}","iat":0,"exp":10,"jti":"{}"}}"#,
            Uuid::nil(),
            Uuid::nil()
        );
        let claims: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
    }
}
