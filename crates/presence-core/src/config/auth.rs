//! Access-token validation configuration.

use serde::{Deserialize, Serialize};

/// Settings for validating access tokens issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
    /// Allowed clock skew in seconds when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_leeway() -> u64 {
    5
}
