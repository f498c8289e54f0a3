// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Serverless-style function endpoints backed by the LLM gateway.

use crate::error::{AppError, Result};
use crate::services::{GenerateRequest, GeneratedSummary, TranslateRequest, TranslatedContent};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

/// Function routes (public, CORS enabled by the router).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/functions/generate-summary", post(generate_summary))
        .route("/functions/translate-summary", post(translate_summary))
}

/// Generate a summary for a YouTube URL.
async fn generate_summary(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<GenerateRequest>, AppError>,
) -> Result<Json<GeneratedSummary>> {
    Ok(Json(state.generator.generate(&request).await?))
}

/// Translate summary content to English or Hindi.
async fn translate_summary(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): WithRejection<Json<TranslateRequest>, AppError>,
) -> Result<Json<TranslatedContent>> {
    Ok(Json(state.translator.translate(&request).await?))
}
