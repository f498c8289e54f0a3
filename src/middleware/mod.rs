// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Middleware modules (authentication).

pub mod auth;

pub use auth::{require_auth, require_uploader};
