// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! HTTP client for the VidSum API and functions.

use crate::client::{ClientError, ClientResult};
use crate::models::{Channel, ProfileUpdate, SummaryWithChannel, UserProfile};
use crate::routes::api::SummariesResponse;
use crate::routes::me::FollowResponse;
use crate::services::{GeneratedSummary, TranslateRequest, TranslatedContent};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_notes: Option<&'a str>,
}

/// Client for the VidSum HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Anonymous client.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Client sending `token` as a Bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        check_response(response).await
    }

    // ─── Catalog ─────────────────────────────────────────────

    /// One page of summaries, newest first.
    pub async fn list_summaries(
        &self,
        category: Option<&str>,
        cursor: Option<&str>,
        limit: u32,
    ) -> ClientResult<SummariesResponse> {
        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.send(self.request(Method::GET, "/api/summaries").query(&query))
            .await
    }

    pub async fn get_summary(&self, id: &str) -> ClientResult<SummaryWithChannel> {
        let path = format!("/api/summaries/{}", urlencoding::encode(id));
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn list_channels(&self) -> ClientResult<Vec<Channel>> {
        self.send(self.request(Method::GET, "/api/channels")).await
    }

    pub async fn get_channel(&self, id: &str) -> ClientResult<Channel> {
        let path = format!("/api/channels/{}", urlencoding::encode(id));
        self.send(self.request(Method::GET, &path)).await
    }

    // ─── Following ───────────────────────────────────────────

    pub async fn following(&self) -> ClientResult<Vec<Channel>> {
        self.send(self.request(Method::GET, "/api/me/following"))
            .await
    }

    pub async fn following_ids(&self) -> ClientResult<Vec<String>> {
        self.send(self.request(Method::GET, "/api/me/following/ids"))
            .await
    }

    /// Follow or unfollow a channel. Both directions are idempotent.
    pub async fn set_following(&self, channel_id: &str, follow: bool) -> ClientResult<FollowResponse> {
        let path = format!("/api/me/following/{}", urlencoding::encode(channel_id));
        let method = if follow { Method::PUT } else { Method::DELETE };
        self.send(self.request(method, &path)).await
    }

    // ─── Profile ─────────────────────────────────────────────

    pub async fn profile(&self) -> ClientResult<UserProfile> {
        self.send(self.request(Method::GET, "/api/me/profile"))
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        self.send(self.request(Method::PUT, "/api/me/profile").json(update))
            .await
    }

    // ─── Functions ───────────────────────────────────────────

    pub async fn generate_summary(
        &self,
        url: &str,
        custom_notes: Option<&str>,
    ) -> ClientResult<GeneratedSummary> {
        let body = GenerateBody { url, custom_notes };
        self.send(
            self.request(Method::POST, "/functions/generate-summary")
                .json(&body),
        )
        .await
    }

    pub async fn translate_summary(
        &self,
        request: &TranslateRequest,
    ) -> ClientResult<TranslatedContent> {
        self.send(
            self.request(Method::POST, "/functions/translate-summary")
                .json(request),
        )
        .await
    }
}

/// Map error statuses and parse the JSON body.
async fn check_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, %body, "API request failed");

        return Err(match status.as_u16() {
            401 => ClientError::Unauthorized,
            402 => ClientError::CreditsExhausted,
            429 => ClientError::RateLimited,
            code => ClientError::Api {
                status: code,
                message: serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.error)
                    .unwrap_or(body),
            },
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}
