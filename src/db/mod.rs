// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{FirestoreDb, SummaryQueryCursor};

/// Collection names as constants.
pub mod collections {
    pub const CHANNELS: &str = "channels";
    /// Follow relations, keyed by `ChannelFollower::document_id`
    pub const CHANNEL_FOLLOWERS: &str = "channel_followers";
    pub const SUMMARIES: &str = "summaries";
    /// User profiles (keyed by user_id)
    pub const PROFILES: &str = "profiles";
}
