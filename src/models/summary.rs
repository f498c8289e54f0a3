// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Summary model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::channel::ChannelSummary;

/// Categories a summary can be filed under.
pub const CATEGORIES: [&str; 6] = [
    "Technology",
    "Finance",
    "Health",
    "Science",
    "Podcast",
    "Entertainment",
];

/// Pseudo-category meaning "no filter" in list queries.
pub const ALL_CATEGORIES: &str = "All";

/// Whether `category` is one of [`CATEGORIES`].
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// Display language of summary content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// English name, as used in model prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    /// BCP 47 locale handed to the speech engine.
    pub fn speech_locale(self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Hi => "hi-IN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "hi" => Ok(Language::Hi),
            other => Err(format!("Unsupported language: {other}")),
        }
    }
}

/// A titled cluster of bullet strings within a summary body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct KeyPointGroup {
    pub title: String,
    /// Bullet items; model replies sometimes call these `points`
    #[serde(default, alias = "points")]
    pub items: Vec<String>,
}

/// Intro plus key-point groups in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LocalizedContent {
    #[serde(default)]
    pub intro: String,
    #[serde(default, alias = "keyPoints", alias = "key_points")]
    pub points: Vec<KeyPointGroup>,
}

/// Stored summary record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Summary {
    /// Document ID
    pub id: String,
    pub youtube_url: String,
    pub youtube_video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    /// Owning channel document ID
    pub channel_id: Option<String>,
    pub category: String,
    pub intro: String,
    pub key_points: Vec<KeyPointGroup>,
    pub read_time_minutes: u32,
    pub listen_time_minutes: u32,
    /// Creation time (RFC3339, millisecond precision)
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_en: Option<LocalizedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hi: Option<LocalizedContent>,
}

impl Summary {
    /// Content to display for `language`.
    ///
    /// Bilingual blocks win when present; otherwise the primary intro and
    /// key points are returned whatever their language.
    pub fn content_for(&self, language: Language) -> LocalizedContent {
        let block = match language {
            Language::En => self.content_en.as_ref(),
            Language::Hi => self.content_hi.as_ref(),
        };
        block.cloned().unwrap_or_else(|| LocalizedContent {
            intro: self.intro.clone(),
            points: self.key_points.clone(),
        })
    }

    /// Whether a dedicated content block exists for `language`.
    pub fn has_content_in(&self, language: Language) -> bool {
        match language {
            Language::En => self.content_en.is_some(),
            Language::Hi => self.content_hi.is_some(),
        }
    }

    /// Whether both bilingual blocks, when present, have the same number
    /// of key-point groups.
    pub fn bilingual_blocks_parallel(&self) -> bool {
        match (&self.content_en, &self.content_hi) {
            (Some(en), Some(hi)) => en.points.len() == hi.points.len(),
            _ => true,
        }
    }
}

/// Summary with its channel embedded, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryWithChannel {
    #[serde(flatten)]
    pub summary: Summary,
    pub channel: Option<ChannelSummary>,
}
