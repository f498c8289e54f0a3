// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Chat-completions client for the LLM gateway.

use crate::config::Config;
use crate::error::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// One chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        }
    }

    /// Send a conversation and return the first choice's text.
    ///
    /// 429 maps to `RateLimited` and 402 to `CreditsExhausted`; every other
    /// failure is an `Llm` error.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "AI gateway error");

            return Err(match status.as_u16() {
                429 => AppError::RateLimited,
                402 => AppError::CreditsExhausted,
                _ => AppError::Llm(format!("HTTP {}", status)),
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("JSON parse error: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Llm("Empty completion".to_string()))
    }
}

/// The outermost `{...}` span of a model reply, if any.
///
/// Models often wrap JSON in prose or code fences; everything from the first
/// `{` to the last `}` is taken.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

/// Parse the JSON object embedded in a model reply.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T, String> {
    let json = extract_json_object(reply).ok_or_else(|| "No JSON found in response".to_string())?;
    serde_json::from_str(json).map_err(|e| e.to_string())
}
