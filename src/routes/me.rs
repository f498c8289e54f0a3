// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Routes for the signed-in user: followed channels and profile.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Channel, Profile, ProfileUpdate, UserProfile};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me/following", get(get_following))
        .route("/api/me/following/ids", get(get_following_ids))
        .route(
            "/api/me/following/{channel_id}",
            put(follow_channel).delete(unfollow_channel),
        )
        .route("/api/me/profile", get(get_profile).put(update_profile))
}

// ─── Following ───────────────────────────────────────────────

/// Result of a follow or unfollow.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FollowResponse {
    pub channel_id: String,
    pub following: bool,
    /// Whether the request changed anything
    pub changed: bool,
}

/// Channels the user follows.
async fn get_following(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Channel>>> {
    let ids = state.db.list_followed_channel_ids(&user.user_id).await?;
    Ok(Json(state.db.get_channels(&ids).await?))
}

/// IDs of the channels the user follows.
async fn get_following_ids(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(state.db.list_followed_channel_ids(&user.user_id).await?))
}

async fn follow_channel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<FollowResponse>> {
    let changed = state.db.follow_channel(&user.user_id, &channel_id).await?;
    Ok(Json(FollowResponse {
        channel_id,
        following: true,
        changed,
    }))
}

async fn unfollow_channel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<Json<FollowResponse>> {
    let changed = state.db.unfollow_channel(&user.user_id, &channel_id).await?;
    Ok(Json(FollowResponse {
        channel_id,
        following: false,
        changed,
    }))
}

// ─── Profile ─────────────────────────────────────────────────

/// Resolved profile of the current user.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let stored = state.db.get_profile(&user.user_id).await?;
    Ok(Json(UserProfile::resolve(
        stored.as_ref(),
        user.email.as_deref(),
        user.name.as_deref(),
    )))
}

/// Apply a partial profile edit and return the resolved profile.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    update
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid profile: {}", e)))?;

    let now = now_rfc3339();
    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_else(|| Profile {
            user_id: user.user_id.clone(),
            name: None,
            email: None,
            avatar_url: None,
            updated_at: now.clone(),
        });
    profile.apply(&update, &now);
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Profile updated");

    Ok(Json(UserProfile::resolve(
        Some(&profile),
        user.email.as_deref(),
        user.name.as_deref(),
    )))
}
