// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Summary generation.
//!
//! Handles the workflow:
//! 1. Validate the URL and extract the video ID
//! 2. Resolve title, channel and logo from YouTube
//! 3. Prompt the LLM for category, timings and bilingual content
//! 4. Substitute a placeholder payload if the reply is not valid JSON

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::summary::{is_known_category, CATEGORIES};
use crate::models::{KeyPointGroup, LocalizedContent};
use crate::reading_time;
use crate::services::llm::{parse_json_reply, ChatMessage, LlmClient};
use crate::services::youtube::{self, ResolvedVideo, YouTubeClient};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Placeholder category when the model picks none of [`CATEGORIES`].
const DEFAULT_CATEGORY: &str = "Technology";

/// Request body of the generate-summary function.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub custom_notes: Option<String>,
}

/// Body content produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(untagged)]
pub enum GeneratedContent {
    Bilingual {
        content_en: LocalizedContent,
        content_hi: LocalizedContent,
    },
    Single {
        intro: String,
        points: Vec<KeyPointGroup>,
    },
}

impl GeneratedContent {
    /// Content used for timing estimates (English block when bilingual).
    fn primary(&self) -> (&str, &[KeyPointGroup]) {
        match self {
            GeneratedContent::Bilingual { content_en, .. } => {
                (&content_en.intro, &content_en.points)
            }
            GeneratedContent::Single { intro, points } => (intro, points),
        }
    }
}

/// Response body of the generate-summary function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSummary {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub channel_logo: Option<String>,
    pub youtube_channel_id: Option<String>,
    pub category: String,
    pub thumbnail: String,
    pub youtube_url: String,
    pub video_id: String,
    pub read_time: u32,
    pub listen_time: u32,
    pub subscribers: String,
    #[serde(flatten)]
    pub content: GeneratedContent,
}

/// Shape the model is asked to return; every field is optional so partial
/// replies still parse.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    category: Option<String>,
    read_time: Option<f64>,
    listen_time: Option<f64>,
    intro: Option<String>,
    points: Option<Vec<KeyPointGroup>>,
    #[serde(rename = "content_en", alias = "contentEn")]
    content_en: Option<LocalizedContent>,
    #[serde(rename = "content_hi", alias = "contentHi")]
    content_hi: Option<LocalizedContent>,
}

impl ModelReply {
    /// Fixed payload substituted when the reply cannot be parsed.
    fn placeholder() -> Self {
        Self {
            category: Some(DEFAULT_CATEGORY.to_string()),
            read_time: Some(5.0),
            listen_time: Some(7.0),
            intro: Some("इस वीडियो में महत्वपूर्ण जानकारी दी गई है।".to_string()),
            points: Some(vec![KeyPointGroup {
                title: "मुख्य बिंदु".to_string(),
                items: vec![
                    "महत्वपूर्ण जानकारी 1".to_string(),
                    "महत्वपूर्ण जानकारी 2".to_string(),
                    "महत्वपूर्ण जानकारी 3".to_string(),
                ],
            }]),
            content_en: None,
            content_hi: None,
        }
    }

    /// Parse a model reply, falling back to [`ModelReply::placeholder`].
    fn parse_or_placeholder(reply: &str) -> Self {
        match parse_json_reply::<ModelReply>(reply) {
            Ok(parsed) if parsed.has_content() => parsed,
            Ok(_) => {
                tracing::warn!("Model reply has no summary content, using placeholder");
                Self::placeholder()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse model reply, using placeholder");
                Self::placeholder()
            }
        }
    }

    fn has_content(&self) -> bool {
        (self.content_en.is_some() && self.content_hi.is_some())
            || self.intro.is_some()
            || self.points.is_some()
    }

    fn into_content(self) -> GeneratedContent {
        match (self.content_en, self.content_hi) {
            (Some(content_en), Some(content_hi)) => GeneratedContent::Bilingual {
                content_en,
                content_hi,
            },
            _ => GeneratedContent::Single {
                intro: self.intro.unwrap_or_default(),
                points: self.points.unwrap_or_default(),
            },
        }
    }
}

/// Whole positive minutes from a model estimate.
fn positive_minutes(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.5)
        .map(|v| v.round() as u32)
}

/// Generates summaries for YouTube videos.
#[derive(Clone)]
pub struct SummaryGenerator {
    youtube: YouTubeClient,
    llm: LlmClient,
}

impl SummaryGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            youtube: YouTubeClient::new(config),
            llm: LlmClient::new(config),
        }
    }

    /// Generate a summary for `request.url`.
    ///
    /// URL problems are rejected before any outbound call.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedSummary> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(AppError::BadRequest("URL is required".to_string()));
        }

        let video_id = youtube::extract_video_id(url)
            .ok_or_else(|| AppError::BadRequest("Invalid YouTube URL".to_string()))?;

        tracing::info!(url, video_id = %video_id, "Generating summary");

        let video = self.youtube.resolve(url, &video_id).await;
        tracing::debug!(
            title = %video.title,
            channel = %video.channel,
            has_logo = video.channel_logo.is_some(),
            "Resolved video metadata"
        );

        let messages = build_messages(&video, url, request.custom_notes.as_deref());
        let reply = self.llm.complete(&messages).await?;
        let parsed = ModelReply::parse_or_placeholder(&reply);

        Ok(assemble(parsed, video, url, &video_id))
    }
}

fn build_messages(video: &ResolvedVideo, url: &str, custom_notes: Option<&str>) -> Vec<ChatMessage> {
    let focus = custom_notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("\nUser's additional focus: {}", n))
        .unwrap_or_default();

    let system = format!(
        r#"You are a YouTube video summarizer. Summarize the video titled "{title}" by "{channel}".

Reply with a single JSON object:
{{
  "category": "One of: {categories}",
  "readTime": number (minutes to read),
  "listenTime": number (minutes to listen),
  "content_en": {{ "intro": "1-2 sentence intro in English", "points": [{{ "title": "...", "items": ["...", "...", "..."] }}] }},
  "content_hi": {{ "intro": "the same intro in Hindi", "points": [same groups, in Hindi] }}
}}

Write 3-4 key points with 3 items each. content_en and content_hi must have the same number of points.{focus}"#,
        title = video.title,
        channel = video.channel,
        categories = CATEGORIES.join(", "),
        focus = focus,
    );

    let user = format!(
        "Create a detailed summary for this YouTube video:\nTitle: {}\nChannel: {}\nURL: {}",
        video.title, video.channel, url
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

fn assemble(reply: ModelReply, video: ResolvedVideo, url: &str, video_id: &str) -> GeneratedSummary {
    let category = reply
        .category
        .clone()
        .filter(|c| is_known_category(c))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let read_time = positive_minutes(reply.read_time);
    let listen_time = positive_minutes(reply.listen_time);

    let content = reply.into_content();
    let (intro, points) = content.primary();
    let read_time = read_time.unwrap_or_else(|| reading_time::read_time_minutes(intro, points));
    let listen_time =
        listen_time.unwrap_or_else(|| reading_time::listen_time_minutes(intro, points));

    if let GeneratedContent::Bilingual {
        content_en,
        content_hi,
    } = &content
    {
        if content_en.points.len() != content_hi.points.len() {
            tracing::warn!(
                en = content_en.points.len(),
                hi = content_hi.points.len(),
                "Bilingual blocks are not parallel"
            );
        }
    }

    GeneratedSummary {
        id: format!("gen-{}", chrono::Utc::now().timestamp_millis()),
        title: video.title,
        channel: video.channel,
        channel_logo: video.channel_logo,
        youtube_channel_id: video.youtube_channel_id,
        category,
        thumbnail: youtube::thumbnail_url(video_id),
        youtube_url: url.to_string(),
        video_id: video_id.to_string(),
        read_time,
        listen_time,
        subscribers: "N/A".to_string(),
        content,
    }
}
