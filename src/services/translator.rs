// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Summary translation between English and Hindi.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{KeyPointGroup, Language};
use crate::services::llm::{parse_json_reply, ChatMessage, LlmClient};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Request body of the translate-summary function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub intro: String,
    #[serde(default)]
    pub key_points: Vec<KeyPointGroup>,
    /// Anything other than `"hi"` means English
    #[serde(default, deserialize_with = "lenient_language")]
    pub target_language: Language,
}

fn lenient_language<'de, D>(deserializer: D) -> std::result::Result<Language, D::Error>
where
    D: Deserializer<'de>,
{
    let code = Option::<String>::deserialize(deserializer)?;
    Ok(match code.as_deref() {
        Some("hi") => Language::Hi,
        _ => Language::En,
    })
}

/// Translated intro and key points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedContent {
    pub intro: String,
    #[serde(default, alias = "key_points", alias = "points")]
    pub key_points: Vec<KeyPointGroup>,
}

/// Translates summary content through the LLM gateway.
#[derive(Clone)]
pub struct Translator {
    llm: LlmClient,
}

impl Translator {
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(config),
        }
    }

    /// Translate `request` into its target language.
    ///
    /// The result always has as many key-point groups as the input.
    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslatedContent> {
        tracing::info!(
            target_language = %request.target_language,
            groups = request.key_points.len(),
            "Translating summary"
        );

        let messages = build_messages(request)?;
        // Translation failures are all reported as gateway errors
        let reply = self.llm.complete(&messages).await.map_err(|e| match e {
            AppError::RateLimited | AppError::CreditsExhausted => AppError::Llm(e.to_string()),
            other => other,
        })?;

        let translated: TranslatedContent = parse_json_reply(&reply).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse translation reply");
            AppError::Llm(format!("Failed to parse translation: {}", e))
        })?;

        check_parallel(&request.key_points, &translated.key_points)?;
        Ok(translated)
    }
}

fn build_messages(request: &TranslateRequest) -> Result<Vec<ChatMessage>> {
    let language = request.target_language.display_name();
    let source = serde_json::to_string_pretty(&serde_json::json!({
        "intro": request.intro,
        "keyPoints": request.key_points,
    }))
    .map_err(|e| AppError::Internal(e.into()))?;

    let system = format!(
        r#"You are a professional translator. Translate the following content to {language}.
Keep the same structure and meaning. Return ONLY valid JSON with the same structure:
{{
  "intro": "translated intro text",
  "keyPoints": [{{ "title": "translated title", "items": ["translated item", ...] }}]
}}"#
    );

    Ok(vec![ChatMessage::system(system), ChatMessage::user(source)])
}

/// Reject a translation whose group count differs from the source.
fn check_parallel(source: &[KeyPointGroup], translated: &[KeyPointGroup]) -> Result<()> {
    if source.len() != translated.len() {
        tracing::error!(
            expected = source.len(),
            got = translated.len(),
            "Translation changed the number of key-point groups"
        );
        return Err(AppError::Llm(format!(
            "Translation returned {} key-point groups, expected {}",
            translated.len(),
            source.len()
        )));
    }
    Ok(())
}
