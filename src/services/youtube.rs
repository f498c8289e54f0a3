// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! YouTube metadata lookups.
//!
//! Handles:
//! - Video ID extraction from watch / short-link / embed / shorts URLs
//! - Title and channel name via the public oEmbed endpoint
//! - Channel ID and logo via the Data API v3 (only when a key is configured)

use crate::config::Config;
use crate::error::AppError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

const UNKNOWN_TITLE: &str = "Unknown Video";
const UNKNOWN_CHANNEL: &str = "Unknown Channel";

fn video_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
            r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Extract the 11-character video ID from a YouTube URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Highest-resolution thumbnail URL for a video.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
}

/// Video title and channel, as resolved for summary generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVideo {
    pub title: String,
    pub channel: String,
    pub channel_logo: Option<String>,
    /// Set when the channel was resolved through the Data API
    pub youtube_channel_id: Option<String>,
}

/// oEmbed response (subset).
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Item<T>>,
}

#[derive(Debug, Deserialize)]
struct Item<T> {
    snippet: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    channel_id: String,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    /// Best available thumbnail URL.
    fn best(self) -> Option<String> {
        self.high
            .or(self.medium)
            .or(self.default)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Channel details from the Data API.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDetails {
    pub channel_id: String,
    pub channel_title: Option<String>,
    pub channel_logo: Option<String>,
}

/// YouTube oEmbed and Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    oembed_url: String,
    api_url: String,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            oembed_url: config.oembed_url.clone(),
            api_url: config.youtube_api_url.trim_end_matches('/').to_string(),
            api_key: config.youtube_api_key.clone(),
        }
    }

    /// Resolve title, channel and (if possible) channel logo.
    ///
    /// Never fails: lookup errors are logged and replaced with placeholders.
    pub async fn resolve(&self, url: &str, video_id: &str) -> ResolvedVideo {
        let (title, mut channel) = match self.fetch_oembed(url).await {
            Ok(meta) => (
                meta.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                meta.author_name
                    .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            ),
            Err(e) => {
                tracing::warn!(error = %e, video_id, "oEmbed lookup failed");
                (UNKNOWN_TITLE.to_string(), UNKNOWN_CHANNEL.to_string())
            }
        };

        let mut channel_logo = None;
        let mut youtube_channel_id = None;

        match self.fetch_channel_details(video_id).await {
            Ok(Some(details)) => {
                if let Some(title) = details.channel_title {
                    channel = title;
                }
                channel_logo = details.channel_logo;
                youtube_channel_id = Some(details.channel_id);
            }
            Ok(None) => {
                tracing::debug!(video_id, "No channel details available, using fallback avatar");
            }
            Err(e) => {
                tracing::warn!(error = %e, video_id, "YouTube Data API lookup failed");
            }
        }

        ResolvedVideo {
            title,
            channel,
            channel_logo,
            youtube_channel_id,
        }
    }

    /// Fetch title and author from the oEmbed endpoint.
    async fn fetch_oembed(&self, url: &str) -> Result<OEmbedResponse, AppError> {
        let response = self
            .http
            .get(&self.oembed_url)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await
            .map_err(|e| AppError::YouTube(e.to_string()))?;

        check_response_json(response).await
    }

    /// Fetch channel ID, title and logo for a video.
    ///
    /// Returns `Ok(None)` when no API key is configured or the video is unknown.
    pub async fn fetch_channel_details(
        &self,
        video_id: &str,
    ) -> Result<Option<ChannelDetails>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let videos: ListResponse<VideoSnippet> = self
            .get_snippets("videos", video_id, api_key)
            .await?;

        let Some(snippet) = videos.items.into_iter().find_map(|i| i.snippet) else {
            tracing::debug!(video_id, "No video snippet found");
            return Ok(None);
        };

        tracing::debug!(
            channel_id = %snippet.channel_id,
            channel_title = ?snippet.channel_title,
            "Found channel for video"
        );

        // A failed logo lookup still yields the channel identity.
        let channel_logo = match self
            .get_snippets::<ChannelSnippet>("channels", &snippet.channel_id, api_key)
            .await
        {
            Ok(channels) => channels
                .items
                .into_iter()
                .find_map(|i| i.snippet)
                .and_then(|s| s.thumbnails)
                .and_then(Thumbnails::best),
            Err(e) => {
                tracing::warn!(error = %e, channel_id = %snippet.channel_id, "Channel lookup failed");
                None
            }
        };

        Ok(Some(ChannelDetails {
            channel_id: snippet.channel_id,
            channel_title: snippet.channel_title,
            channel_logo,
        }))
    }

    async fn get_snippets<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        id: &str,
        api_key: &str,
    ) -> Result<ListResponse<T>, AppError> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_url, resource))
            .query(&[("part", "snippet"), ("id", id), ("key", api_key)])
            .send()
            .await
            .map_err(|e| AppError::YouTube(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::YouTube(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::YouTube(format!("JSON parse error: {}", e)))
}
