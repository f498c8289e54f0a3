// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT key, LLM key, YouTube key) are injected as environment
//! variables by the deployment and read once at startup.

use std::env;

/// Default OpenAI-compatible chat-completions endpoint of the AI gateway.
pub const DEFAULT_LLM_API_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
/// Default model used for generation and translation.
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-2.5-flash";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Chat-completions endpoint of the LLM gateway
    pub llm_api_url: String,
    /// Model name sent with every completion request
    pub llm_model: String,
    /// Base URL of the YouTube oEmbed endpoint
    pub oembed_url: String,
    /// Base URL of the YouTube Data API v3
    pub youtube_api_url: String,
    /// User IDs allowed to upload summaries
    pub uploader_ids: Vec<String>,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// LLM gateway API key
    pub llm_api_key: String,
    /// YouTube Data API key; channel logos are skipped when absent
    pub youtube_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            llm_api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            oembed_url: env::var("YOUTUBE_OEMBED_URL")
                .unwrap_or_else(|_| "https://www.youtube.com/oembed".to_string()),
            youtube_api_url: env::var("YOUTUBE_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string()),
            uploader_ids: env::var("UPLOADER_IDS")
                .map(|v| parse_id_list(&v))
                .unwrap_or_default(),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            llm_api_key: env::var("LLM_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("LLM_API_KEY"))?,
            youtube_api_key: env::var("YOUTUBE_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Config for tests: no YouTube key, unreachable LLM endpoint.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            llm_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            oembed_url: "http://127.0.0.1:9/oembed".to_string(),
            youtube_api_url: "http://127.0.0.1:9/youtube/v3".to_string(),
            uploader_ids: vec!["uploader-1".to_string()],
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            llm_api_key: "test_llm_key".to_string(),
            youtube_api_key: None,
        }
    }

    /// Whether `user_id` is on the configured uploader allow-list.
    pub fn is_uploader(&self, user_id: &str) -> bool {
        self.uploader_ids.iter().any(|id| id == user_id)
    }
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
