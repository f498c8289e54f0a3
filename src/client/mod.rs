// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Client-side data layer for the VidSum web app.
//!
//! Views bind to these types instead of talking to the API directly:
//! - [`api::ApiClient`] wraps the HTTP routes and functions
//! - [`cache::QueryCache`] holds fetched data with per-key stale times
//! - [`queries::Queries`] reads feeds, channels, follows and the profile
//!   through the cache
//! - [`following::FollowController`] applies debounced optimistic follows
//! - [`library`] keeps device-local saved / recent lists and preferences
//! - [`translations::TranslationCache`] memoizes translated summaries
//! - [`speech::SpeechPlayer`] estimates read-aloud progress

pub mod api;
pub mod cache;
pub mod debounce;
pub mod following;
pub mod library;
pub mod local_store;
pub mod optimistic;
pub mod queries;
pub mod speech;
pub mod toggle;
pub mod translations;

pub use api::ApiClient;
pub use cache::{QueryCache, QueryKey};
pub use following::{FollowController, FollowStore, LocalFollows, RemoteFollows};
pub use local_store::LocalStore;
pub use queries::Queries;

/// Errors surfaced by the client data layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits exhausted. Please add more credits.")]
    CreditsExhausted,

    #[error("Not signed in")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Result type alias for the client layer
pub type ClientResult<T> = std::result::Result<T, ClientError>;
