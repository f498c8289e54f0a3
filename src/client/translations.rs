// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Read-through cache of translated summary content.

use crate::client::api::ApiClient;
use crate::client::local_store::{keys, LocalStore};
use crate::client::ClientResult;
use crate::models::{Language, LocalizedContent, Summary};
use crate::services::{TranslateRequest, TranslatedContent};
use dashmap::DashMap;
use std::future::Future;

/// Translates summary content on demand.
pub trait TranslationSource: Send + Sync {
    fn translate(
        &self,
        request: &TranslateRequest,
    ) -> impl Future<Output = ClientResult<TranslatedContent>> + Send;
}

impl TranslationSource for ApiClient {
    fn translate(
        &self,
        request: &TranslateRequest,
    ) -> impl Future<Output = ClientResult<TranslatedContent>> + Send {
        self.translate_summary(request)
    }
}

/// Language the text is written in, judged by its script.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        Language::Hi
    } else {
        Language::En
    }
}

/// Translation cache keyed by summary ID and language, backed by memory
/// and the local store.
pub struct TranslationCache<S> {
    source: S,
    store: LocalStore,
    memory: DashMap<(String, Language), LocalizedContent>,
}

impl<S: TranslationSource> TranslationCache<S> {
    pub fn new(source: S, store: LocalStore) -> Self {
        Self {
            source,
            store,
            memory: DashMap::new(),
        }
    }

    /// Content of `summary` in `language`.
    ///
    /// Bilingual blocks and content already in `language` are returned
    /// without a translation call.
    pub async fn content(&self, summary: &Summary, language: Language) -> ClientResult<LocalizedContent> {
        if summary.has_content_in(language) || detect_language(&summary.intro) == language {
            return Ok(summary.content_for(language));
        }

        let cache_key = (summary.id.clone(), language);
        if let Some(hit) = self.memory.get(&cache_key) {
            return Ok(hit.clone());
        }

        let store_key = keys::translation(&summary.id, language.code());
        if let Some(stored) = self.store.get::<LocalizedContent>(&store_key) {
            self.memory.insert(cache_key, stored.clone());
            return Ok(stored);
        }

        tracing::debug!(summary_id = %summary.id, %language, "Requesting translation");
        let translated = self
            .source
            .translate(&TranslateRequest {
                intro: summary.intro.clone(),
                key_points: summary.key_points.clone(),
                target_language: language,
            })
            .await?;

        let content = LocalizedContent {
            intro: translated.intro,
            points: translated.key_points,
        };
        if let Err(e) = self.store.set(&store_key, &content) {
            tracing::warn!(summary_id = %summary.id, error = %e, "Failed to persist translation");
        }
        self.memory.insert(cache_key, content.clone());
        Ok(content)
    }
}
