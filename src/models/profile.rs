// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const FALLBACK_NAME: &str = "User";
const FALLBACK_EMAIL: &str = "user@example.com";

/// Profile stored in Firestore, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Authenticated user ID (also used as document ID)
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Last edit (RFC3339)
    pub updated_at: String,
}

impl Profile {
    /// Merge a partial update; empty strings leave the field untouched.
    pub fn apply(&mut self, update: &ProfileUpdate, now: &str) {
        if let Some(name) = non_empty(update.name.as_deref()) {
            self.name = Some(name.to_string());
        }
        if let Some(email) = non_empty(update.email.as_deref()) {
            self.email = Some(email.to_string());
        }
        if let Some(avatar) = non_empty(update.avatar.as_deref()) {
            self.avatar_url = Some(avatar.to_string());
        }
        self.updated_at = now.to_string();
    }
}

/// Partial profile edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, validator::Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileUpdate {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 2048))]
    pub avatar: Option<String>,
}

/// Profile as displayed, with every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    /// Avatar URL, or a seed string for a generated avatar
    pub avatar: String,
}

impl UserProfile {
    /// Resolve the displayed profile from the stored record and the
    /// identity carried by the session token.
    pub fn resolve(
        stored: Option<&Profile>,
        token_email: Option<&str>,
        token_name: Option<&str>,
    ) -> Self {
        let token_email = non_empty(token_email);
        let token_name = non_empty(token_name);

        match stored {
            Some(profile) => {
                let stored_name = non_empty(profile.name.as_deref());
                let name = stored_name.or(token_name).unwrap_or(FALLBACK_NAME);
                Self {
                    name: name.to_string(),
                    email: non_empty(profile.email.as_deref())
                        .or(token_email)
                        .unwrap_or(FALLBACK_EMAIL)
                        .to_string(),
                    avatar: non_empty(profile.avatar_url.as_deref())
                        .or(stored_name)
                        .unwrap_or(FALLBACK_NAME)
                        .to_string(),
                }
            }
            None => Self {
                name: token_name
                    .or_else(|| token_email.and_then(|e| e.split('@').next()))
                    .filter(|s| !s.is_empty())
                    .unwrap_or(FALLBACK_NAME)
                    .to_string(),
                email: token_email.unwrap_or(FALLBACK_EMAIL).to_string(),
                avatar: token_name.unwrap_or(FALLBACK_NAME).to_string(),
            },
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(name: Option<&str>, avatar: Option<&str>) -> Profile {
        Profile {
            user_id: "u1".to_string(),
            name: name.map(str::to_string),
            email: None,
            avatar_url: avatar.map(str::to_string),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_resolve_without_stored_profile_uses_email_prefix() {
        let profile = UserProfile::resolve(None, Some("priya@example.in"), None);
        assert_eq!(profile.name, "priya");
        assert_eq!(profile.email, "priya@example.in");
        assert_eq!(profile.avatar, "User");
    }

    #[test]
    fn test_resolve_prefers_stored_values() {
        let p = stored(Some("Asha"), Some("https://cdn/a.png"));
        let profile = UserProfile::resolve(Some(&p), Some("a@b.c"), Some("Token Name"));
        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.email, "a@b.c");
        assert_eq!(profile.avatar, "https://cdn/a.png");
    }

    #[test]
    fn test_resolve_avatar_falls_back_to_stored_name() {
        let p = stored(Some("Asha"), None);
        let profile = UserProfile::resolve(Some(&p), None, None);
        assert_eq!(profile.avatar, "Asha");
        assert_eq!(profile.email, "user@example.com");
    }

    #[test]
    fn test_apply_ignores_empty_fields() {
        let mut p = stored(Some("Asha"), None);
        let update = ProfileUpdate {
            name: Some("   ".to_string()),
            email: Some("asha@example.com".to_string()),
            avatar: None,
        };
        p.apply(&update, "2024-02-02T00:00:00.000Z");
        assert_eq!(p.name.as_deref(), Some("Asha"));
        assert_eq!(p.email.as_deref(), Some("asha@example.com"));
        assert_eq!(p.updated_at, "2024-02-02T00:00:00.000Z");
    }
}
