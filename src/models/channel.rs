// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Channel and follower models for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored channel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Channel {
    /// Document ID
    pub id: String,
    /// Display name (unique, compared case-insensitively)
    pub name: String,
    /// YouTube channel ID, when resolved through the Data API
    #[serde(default)]
    pub youtube_channel_id: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Subscriber count as displayed by YouTube ("1.2M")
    #[serde(default)]
    pub subscribers_count: Option<String>,
    /// Number of VidSum users following this channel
    #[serde(default)]
    pub followers_count: u32,
    /// Lowercased name, used for lookups by name
    #[serde(default)]
    pub name_key: String,
}

impl Channel {
    /// Lookup key for a channel display name.
    pub fn name_key_for(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Document ID of the channel named `name`.
    ///
    /// Derived from the name key, so concurrent creators of the same channel
    /// target one document.
    pub fn id_for_name(name: &str) -> String {
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, Self::name_key_for(name).as_bytes())
            .to_string()
    }

    /// Whether `candidate` should replace the stored logo.
    ///
    /// A logo resolved through the YouTube Data API always wins over an
    /// existing one; any logo wins over none.
    pub fn should_replace_logo(&self, candidate: Option<&str>, authoritative: bool) -> bool {
        match (self.logo_url.as_deref(), candidate) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(current), Some(new)) => authoritative && current != new,
        }
    }
}

/// Compact channel view embedded in summaries and follow lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChannelSummary {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub followers_count: u32,
}

impl From<Channel> for ChannelSummary {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            logo_url: channel.logo_url,
            followers_count: channel.followers_count,
        }
    }
}

/// Follow relation between a user and a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFollower {
    pub user_id: String,
    pub channel_id: String,
    /// When the follow was recorded (RFC3339)
    pub created_at: String,
}

impl ChannelFollower {
    /// Document ID; one document per (user, channel) pair.
    pub fn document_id(user_id: &str, channel_id: &str) -> String {
        format!(
            "{}:{}",
            urlencoding::encode(user_id),
            urlencoding::encode(channel_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(logo: Option<&str>) -> Channel {
        Channel {
            id: "c1".to_string(),
            name: "Tech Insights".to_string(),
            youtube_channel_id: None,
            logo_url: logo.map(str::to_string),
            subscribers_count: None,
            followers_count: 0,
            name_key: Channel::name_key_for("Tech Insights"),
        }
    }

    #[test]
    fn test_channel_id_follows_name_key() {
        let id = Channel::id_for_name("Tech Insights");
        assert_eq!(id, Channel::id_for_name("  tech INSIGHTS"));
        assert_ne!(id, Channel::id_for_name("Tech Insights 2"));
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_name_key_is_case_insensitive() {
        assert_eq!(Channel::name_key_for("  Tech INSIGHTS "), "tech insights");
    }

    #[test]
    fn test_logo_replacement_rules() {
        assert!(channel(None).should_replace_logo(Some("a.png"), false));
        assert!(!channel(Some("a.png")).should_replace_logo(Some("b.png"), false));
        assert!(channel(Some("a.png")).should_replace_logo(Some("b.png"), true));
        assert!(!channel(Some("a.png")).should_replace_logo(Some("a.png"), true));
        assert!(!channel(Some("a.png")).should_replace_logo(None, true));
    }

    #[test]
    fn test_follower_document_id_is_pair_unique() {
        assert_eq!(ChannelFollower::document_id("u1", "c1"), "u1:c1");
        assert_ne!(
            ChannelFollower::document_id("u:1", "c"),
            ChannelFollower::document_id("u", "1:c")
        );
    }
}
