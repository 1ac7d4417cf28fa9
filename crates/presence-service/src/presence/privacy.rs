//! Privacy settings resolution from profile settings blobs.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use presence_core::result::AppResult;
use presence_entity::privacy::{PrivacySettings, Visibility};

use crate::store::ProfileSettingsSource;

/// Loads each user's presence privacy from their profile.
#[derive(Debug, Clone)]
pub struct PrivacyResolver {
    profiles: Arc<dyn ProfileSettingsSource>,
}

impl PrivacyResolver {
    /// Creates a resolver over the profile settings provider.
    pub fn new(profiles: Arc<dyn ProfileSettingsSource>) -> Self {
        Self { profiles }
    }

    /// Privacy settings of one user.
    pub async fn privacy_of(&self, user_id: Uuid) -> AppResult<PrivacySettings> {
        let mut resolved = self.resolve_many(&[user_id]).await?;
        Ok(resolved.remove(&user_id).unwrap_or_default())
    }

    /// Privacy settings of every given user, in one provider call.
    ///
    /// Users without a profile get the fully visible default.
    pub async fn resolve_many(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, PrivacySettings>> {
        let blobs = self.profiles.settings_of(user_ids).await?;
        Ok(user_ids
            .iter()
            .map(|id| (*id, blobs.get(id).map(parse_settings).unwrap_or_default()))
            .collect())
    }
}

/// Extract [`PrivacySettings`] from a profile settings blob.
///
/// Reads `settings.privacy`. Every field that is missing or has the wrong
/// shape falls back to its default on its own; this never fails.
pub fn parse_settings(settings: &Value) -> PrivacySettings {
    let defaults = PrivacySettings::default();
    let Some(privacy) = settings.get("privacy").and_then(Value::as_object) else {
        return defaults;
    };

    PrivacySettings {
        show_status: privacy
            .get("show_status")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.show_status),
        show_last_seen: privacy
            .get("show_last_seen")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.show_last_seen),
        visibility: privacy
            .get("visibility")
            .and_then(Value::as_str)
            .and_then(Visibility::parse)
            .unwrap_or(defaults.visibility),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryProfiles;
    use serde_json::json;

    #[test]
    fn test_full_settings_parse() {
        let parsed = parse_settings(&json!({
            "theme": "dark",
            "privacy": {"show_status": false, "show_last_seen": false, "visibility": "shared"}
        }));
        assert_eq!(
            parsed,
            PrivacySettings {
                show_status: false,
                show_last_seen: false,
                visibility: Visibility::Shared,
            }
        );
    }

    #[test]
    fn test_malformed_fields_default_individually() {
        let parsed = parse_settings(&json!({
            "privacy": {"show_status": "no", "show_last_seen": false, "visibility": "friends"}
        }));
        assert!(parsed.show_status);
        assert!(!parsed.show_last_seen);
        assert_eq!(parsed.visibility, Visibility::Everyone);
    }

    #[test]
    fn test_missing_or_wrong_privacy_shape_is_default() {
        for blob in [json!({}), json!({"privacy": "hidden"}), json!(null), json!([1, 2])] {
            assert_eq!(parse_settings(&blob), PrivacySettings::default());
        }
    }

    #[tokio::test]
    async fn test_users_without_profile_get_default() {
        let profiles = Arc::new(InMemoryProfiles::default());
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        profiles
            .set(known, json!({"privacy": {"visibility": "nobody"}}))
            .await;

        let resolver = PrivacyResolver::new(profiles);
        let resolved = resolver.resolve_many(&[known, unknown]).await.unwrap();
        assert_eq!(resolved[&known].visibility, Visibility::Nobody);
        assert_eq!(resolved[&unknown], PrivacySettings::default());
        assert_eq!(
            resolver.privacy_of(known).await.unwrap().visibility,
            Visibility::Nobody
        );
    }
}
