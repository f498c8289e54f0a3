// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Data models for the application.

pub mod channel;
pub mod profile;
pub mod summary;

pub use channel::{Channel, ChannelFollower, ChannelSummary};
pub use profile::{Profile, ProfileUpdate, UserProfile};
pub use summary::{KeyPointGroup, Language, LocalizedContent, Summary, SummaryWithChannel};
