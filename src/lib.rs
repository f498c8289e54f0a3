// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! VidSum: bite-sized YouTube video summaries in English and Hindi.
//!
//! This crate provides the backend API (summaries, channels, followers,
//! profiles, and the summary generation / translation functions backed by an
//! LLM gateway) together with the client-side data layer the mobile web app
//! binds to.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reading_time;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{SummaryGenerator, Translator};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub generator: SummaryGenerator,
    pub translator: Translator,
}

impl AppState {
    /// Build the state and its services from configuration.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let generator = SummaryGenerator::new(&config);
        let translator = Translator::new(&config);
        Self {
            config,
            db,
            generator,
            translator,
        }
    }
}
