// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Summary publishing.
//!
//! An upload references its channel by display name. The channel is created
//! on first sight, and its logo is refreshed when a better one arrives.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::summary::is_known_category;
use crate::models::{Channel, ChannelSummary, KeyPointGroup, LocalizedContent, Summary, SummaryWithChannel};
use crate::reading_time;
use crate::services::youtube;
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Summary upload, as posted by an uploader.
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryUpload {
    #[validate(length(min = 1, max = 2048))]
    pub youtube_url: String,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub channel_name: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub channel_logo: Option<String>,
    /// Set when the logo came from the YouTube Data API
    #[serde(default)]
    pub youtube_channel_id: Option<String>,
    #[serde(default)]
    pub subscribers: Option<String>,
    pub category: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub key_points: Vec<KeyPointGroup>,
    #[serde(default)]
    pub content_en: Option<LocalizedContent>,
    #[serde(default)]
    pub content_hi: Option<LocalizedContent>,
}

/// What to do with the channel an upload refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelPlan {
    /// Channel exists and needs no change
    Keep(Channel),
    /// Channel exists; write the updated record
    Update(Channel),
    /// Channel is new
    Create(Channel),
}

impl ChannelPlan {
    pub fn channel(&self) -> &Channel {
        match self {
            ChannelPlan::Keep(c) | ChannelPlan::Update(c) | ChannelPlan::Create(c) => c,
        }
    }

    pub fn into_channel(self) -> Channel {
        match self {
            ChannelPlan::Keep(c) | ChannelPlan::Update(c) | ChannelPlan::Create(c) => c,
        }
    }
}

/// Decide how to reconcile `existing` with the channel fields of `upload`.
///
/// A new channel gets the document ID derived from its name.
pub fn plan_channel(existing: Option<Channel>, upload: &SummaryUpload) -> ChannelPlan {
    let logo = upload.channel_logo.as_deref().filter(|l| !l.is_empty());
    let authoritative = upload.youtube_channel_id.is_some();

    let Some(mut channel) = existing else {
        let name = upload.channel_name.trim().to_string();
        return ChannelPlan::Create(Channel {
            id: Channel::id_for_name(&name),
            name_key: Channel::name_key_for(&name),
            name,
            youtube_channel_id: upload.youtube_channel_id.clone(),
            logo_url: logo.map(str::to_string),
            subscribers_count: upload.subscribers.clone(),
            followers_count: 0,
        });
    };

    let mut changed = false;
    if channel.should_replace_logo(logo, authoritative) {
        channel.logo_url = logo.map(str::to_string);
        changed = true;
    }
    if channel.youtube_channel_id.is_none() && upload.youtube_channel_id.is_some() {
        channel.youtube_channel_id = upload.youtube_channel_id.clone();
        changed = true;
    }

    if changed {
        ChannelPlan::Update(channel)
    } else {
        ChannelPlan::Keep(channel)
    }
}

/// Check an upload beyond what the derive validation covers.
///
/// Returns the YouTube video ID.
pub fn check_upload(upload: &SummaryUpload) -> Result<String> {
    upload
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid summary: {}", e)))?;

    if !is_known_category(&upload.category) {
        return Err(AppError::BadRequest(format!(
            "Unknown category: {}",
            upload.category
        )));
    }

    youtube::extract_video_id(&upload.youtube_url)
        .ok_or_else(|| AppError::BadRequest("Invalid YouTube URL".to_string()))
}

/// Content the timings are measured on.
///
/// The top-level fields win; an upload that only carries language blocks is
/// measured on the English block, then the Hindi one.
fn primary_content(upload: &SummaryUpload) -> (&str, &[KeyPointGroup]) {
    if !upload.intro.trim().is_empty() || !upload.key_points.is_empty() {
        return (&upload.intro, &upload.key_points);
    }
    match (&upload.content_en, &upload.content_hi) {
        (Some(block), _) | (None, Some(block)) => (&block.intro, &block.points),
        (None, None) => (&upload.intro, &upload.key_points),
    }
}

/// Build the stored summary for `upload` under `channel_id`.
///
/// Read and listen times are always computed from the primary content.
pub fn build_summary(
    upload: SummaryUpload,
    id: String,
    video_id: String,
    channel_id: String,
    created_at: String,
) -> Summary {
    if let (Some(en), Some(hi)) = (&upload.content_en, &upload.content_hi) {
        if en.points.len() != hi.points.len() {
            tracing::warn!(
                summary_id = %id,
                en = en.points.len(),
                hi = hi.points.len(),
                "Uploaded bilingual blocks are not parallel"
            );
        }
    }

    let (intro, points) = primary_content(&upload);
    let read_time_minutes = reading_time::read_time_minutes(intro, points);
    let listen_time_minutes = reading_time::listen_time_minutes(intro, points);

    Summary {
        read_time_minutes,
        listen_time_minutes,
        thumbnail: Some(youtube::thumbnail_url(&video_id)),
        id,
        youtube_url: upload.youtube_url,
        youtube_video_id: video_id,
        title: upload.title,
        channel_id: Some(channel_id),
        category: upload.category,
        intro: upload.intro,
        key_points: upload.key_points,
        created_at,
        content_en: upload.content_en,
        content_hi: upload.content_hi,
    }
}

/// Validate and store an upload, creating or refreshing its channel.
pub async fn publish(db: &FirestoreDb, upload: SummaryUpload) -> Result<SummaryWithChannel> {
    let video_id = check_upload(&upload)?;

    let existing = db.find_channel_by_name(&upload.channel_name).await?;
    let plan = match plan_channel(existing, &upload) {
        ChannelPlan::Create(channel) => match db.create_channel(&channel).await? {
            None => {
                tracing::info!(channel_id = %channel.id, name = %channel.name, "Created channel");
                ChannelPlan::Create(channel)
            }
            // A concurrent upload created it first
            Some(stored) => plan_channel(Some(stored), &upload),
        },
        plan => plan,
    };

    if let ChannelPlan::Update(channel) = &plan {
        db.upsert_channel(channel).await?;
        tracing::info!(channel_id = %channel.id, "Updated channel logo");
    }

    let channel = plan.into_channel();
    let summary = build_summary(
        upload,
        uuid::Uuid::new_v4().to_string(),
        video_id,
        channel.id.clone(),
        now_rfc3339(),
    );
    db.insert_summary(&summary).await?;

    tracing::info!(
        summary_id = %summary.id,
        channel_id = %channel.id,
        category = %summary.category,
        "Published summary"
    );

    Ok(SummaryWithChannel {
        summary,
        channel: Some(ChannelSummary::from(channel)),
    })
}
