// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Catalog routes: summaries and channels.

use crate::db::SummaryQueryCursor;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::summary::{is_known_category, ALL_CATEGORIES};
use crate::models::{Channel, ChannelSummary, Summary, SummaryWithChannel};
use crate::services::catalog::{self, SummaryUpload};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Public catalog routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/summaries", get(list_summaries))
        .route("/api/summaries/{id}", get(get_summary))
        .route("/api/channels", get(list_channels))
        .route("/api/channels/{id}", get(get_channel))
}

/// Upload route; the auth and uploader middleware are applied in routes/mod.rs.
pub fn upload_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/summaries", post(upload_summary))
}

// ─── Summaries ───────────────────────────────────────────────

#[derive(Deserialize)]
struct SummariesQuery {
    /// Category filter; absent or "All" means no filter
    category: Option<String>,
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    20
}

const MAX_LIMIT: u32 = 100;

fn parse_category(category: Option<&str>) -> Result<Option<&str>> {
    match category {
        None | Some("") => Ok(None),
        Some(c) if c == ALL_CATEGORIES => Ok(None),
        Some(c) if is_known_category(c) => Ok(Some(c)),
        Some(c) => Err(AppError::BadRequest(format!("Unknown category: {}", c))),
    }
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<SummaryQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = String::from_utf8(decoded).map_err(|_| invalid_cursor())?;

            let (created_at, id) = decoded_str.split_once('|').ok_or_else(invalid_cursor)?;
            if created_at.is_empty() || id.is_empty() {
                return Err(invalid_cursor());
            }
            chrono::DateTime::parse_from_rfc3339(created_at).map_err(|_| invalid_cursor())?;

            Ok(SummaryQueryCursor {
                created_at: created_at.to_string(),
                id: id.to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(summary: &Summary) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}|{}", summary.created_at, summary.id))
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummariesResponse {
    pub summaries: Vec<SummaryWithChannel>,
    pub next_cursor: Option<String>,
}

/// Attach each summary's channel.
async fn with_channels(state: &AppState, summaries: Vec<Summary>) -> Result<Vec<SummaryWithChannel>> {
    let mut channel_ids: Vec<String> = summaries
        .iter()
        .filter_map(|s| s.channel_id.clone())
        .collect();
    channel_ids.sort();
    channel_ids.dedup();

    let channels: HashMap<String, ChannelSummary> = state
        .db
        .get_channels(&channel_ids)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), ChannelSummary::from(c)))
        .collect();

    Ok(summaries
        .into_iter()
        .map(|summary| {
            let channel = summary
                .channel_id
                .as_ref()
                .and_then(|id| channels.get(id).cloned());
            SummaryWithChannel { summary, channel }
        })
        .collect())
}

/// List summaries newest first.
async fn list_summaries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummariesQuery>,
) -> Result<Json<SummariesResponse>> {
    tracing::debug!(
        category = ?params.category,
        cursor = ?params.cursor,
        limit = params.limit,
        "Listing summaries"
    );

    if params.limit == 0 {
        return Err(AppError::BadRequest(
            "Limit must be greater than 0".to_string(),
        ));
    }
    let limit = params.limit.min(MAX_LIMIT);
    let category = parse_category(params.category.as_deref())?;
    let cursor = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let mut results = state
        .db
        .list_summaries(category, cursor.as_ref(), limit.saturating_add(1))
        .await?;

    let has_more = results.len() > limit as usize;
    if has_more {
        results.truncate(limit as usize);
    }
    let next_cursor = if has_more {
        results.last().map(encode_cursor)
    } else {
        None
    };

    Ok(Json(SummariesResponse {
        summaries: with_channels(&state, results).await?,
        next_cursor,
    }))
}

/// Get one summary with its channel.
async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SummaryWithChannel>> {
    let summary = state
        .db
        .get_summary(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Summary {}", id)))?;

    let channel = match summary.channel_id.as_deref() {
        Some(channel_id) => state.db.get_channel(channel_id).await?.map(ChannelSummary::from),
        None => None,
    };

    Ok(Json(SummaryWithChannel { summary, channel }))
}

/// Publish a summary (uploader only).
async fn upload_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(upload): Json<SummaryUpload>,
) -> Result<(StatusCode, Json<SummaryWithChannel>)> {
    tracing::info!(user_id = %user.user_id, url = %upload.youtube_url, "Summary upload");

    let published = catalog::publish(&state.db, upload).await?;
    Ok((StatusCode::CREATED, Json(published)))
}

// ─── Channels ────────────────────────────────────────────────

/// List channels, most followed first.
async fn list_channels(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Channel>>> {
    Ok(Json(state.db.list_channels().await?))
}

/// Get one channel.
async fn get_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Channel>> {
    state
        .db
        .get_channel(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Channel {}", id)))
}
