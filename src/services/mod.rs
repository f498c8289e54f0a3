// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Services module - business logic layer.

pub mod catalog;
pub mod generator;
pub mod llm;
pub mod translator;
pub mod youtube;

pub use catalog::SummaryUpload;
pub use generator::{GenerateRequest, GeneratedContent, GeneratedSummary, SummaryGenerator};
pub use llm::LlmClient;
pub use translator::{TranslateRequest, TranslatedContent, Translator};
pub use youtube::YouTubeClient;
