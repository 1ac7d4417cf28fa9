//! Cache key builders for every cache entry the presence engine uses.

use uuid::Uuid;

/// Prefix applied to all presence cache keys.
const PREFIX: &str = "presence";

/// Per-user change marker counter.
pub fn presence_marker(user_id: Uuid) -> String {
    format!("{PREFIX}:marker:{user_id}")
}

/// Revoked access token, keyed by its JWT id.
pub fn jwt_blocklist(jti: Uuid) -> String {
    format!("{PREFIX}:jwt:blocked:{jti}")
}

/// Key written and read back by readiness probes.
pub fn health_probe() -> String {
    format!("{PREFIX}:health")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_key() {
        assert_eq!(
            presence_marker(Uuid::nil()),
            "presence:marker:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_blocklist_key() {
        assert_eq!(
            jwt_blocklist(Uuid::nil()),
            "presence:jwt:blocked:00000000-0000-0000-0000-000000000000"
        );
    }
}
