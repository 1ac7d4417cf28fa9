//! Presence privacy settings.

use serde::{Deserialize, Serialize};

/// Who may see a user's presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Any authenticated viewer.
    #[default]
    Everyone,
    /// Only viewers sharing at least one group with the user.
    Shared,
    /// Nobody but the user.
    Nobody,
}

impl Visibility {
    /// Parse a stored value. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "everyone" => Some(Self::Everyone),
            "shared" => Some(Self::Shared),
            "nobody" => Some(Self::Nobody),
            _ => None,
        }
    }
}

/// Per-user presence privacy, embedded in the profile settings blob
/// under the `privacy` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    /// Whether the status is shown at all.
    pub show_status: bool,
    /// Whether the last-seen timestamp is shown.
    pub show_last_seen: bool,
    /// Audience allowed to see presence.
    pub visibility: Visibility,
}

impl Default for PrivacySettings {
    /// Fully visible to everyone.
    fn default() -> Self {
        Self {
            show_status: true,
            show_last_seen: true,
            visibility: Visibility::Everyone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_defaults_to_everyone() {
        assert_eq!(Visibility::default(), Visibility::Everyone);
        assert_eq!(PrivacySettings::default().visibility, Visibility::default());
        assert_eq!(Visibility::parse(" Shared "), Some(Visibility::Shared));
        assert_eq!(Visibility::parse("friends"), None);
    }
}
