// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Cached reads that views bind to.
//!
//! Every read goes through [`QueryCache::get_or_fetch`], so fresh data is
//! served from memory and stale data is refetched from the API.

use crate::client::api::ApiClient;
use crate::client::cache::{QueryCache, QueryFamily, QueryKey, SummaryFeed};
use crate::client::{ClientError, ClientResult};
use crate::models::{Channel, ProfileUpdate, SummaryWithChannel, UserProfile};

/// Page size used when walking a summary feed.
const FEED_PAGE_SIZE: u32 = 100;

/// Read-through queries for one user (or a guest).
#[derive(Clone)]
pub struct Queries {
    api: ApiClient,
    cache: QueryCache,
    user_key: String,
}

impl Queries {
    /// `user_key` scopes per-user entries; use the same key as the
    /// [`FollowController`](crate::client::FollowController).
    pub fn new(api: ApiClient, cache: QueryCache, user_key: impl Into<String>) -> Self {
        Self {
            api,
            cache,
            user_key: user_key.into(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Home feed, newest first. Fresh for an hour.
    pub async fn home_summaries(&self, category: Option<&str>) -> ClientResult<Vec<SummaryWithChannel>> {
        self.feed(SummaryFeed::Home, category).await
    }

    /// Explore feed, newest first. Fresh for ten minutes.
    pub async fn explore_summaries(
        &self,
        category: Option<&str>,
    ) -> ClientResult<Vec<SummaryWithChannel>> {
        self.feed(SummaryFeed::Explore, category).await
    }

    /// Force both feeds to refetch on their next read.
    pub fn refresh_summaries(&self) {
        self.cache.invalidate(QueryFamily::Summaries);
    }

    async fn feed(
        &self,
        feed: SummaryFeed,
        category: Option<&str>,
    ) -> ClientResult<Vec<SummaryWithChannel>> {
        // "All" and no filter share one entry
        let category = category.filter(|c| *c != "All").map(str::to_string);
        let key = QueryKey::Summaries {
            feed,
            category: category.clone(),
        };
        let api = &self.api;
        self.cache
            .get_or_fetch(key, || async move {
                let mut summaries = Vec::new();
                let mut cursor: Option<String> = None;
                loop {
                    let page = api
                        .list_summaries(category.as_deref(), cursor.as_deref(), FEED_PAGE_SIZE)
                        .await?;
                    summaries.extend(page.summaries);
                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Ok(summaries)
            })
            .await
    }

    /// One summary with its channel; `None` if it does not exist.
    pub async fn summary(&self, id: &str) -> ClientResult<Option<SummaryWithChannel>> {
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::Summary(id.to_string()), || async move {
                match api.get_summary(id).await {
                    Ok(summary) => Ok(Some(summary)),
                    Err(ClientError::Api { status: 404, .. }) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// Every channel, most followed first.
    pub async fn channels(&self) -> ClientResult<Vec<Channel>> {
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::Channels, || api.list_channels())
            .await
    }

    pub async fn channel(&self, id: &str) -> ClientResult<Channel> {
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::Channel(id.to_string()), || api.get_channel(id))
            .await
    }

    /// IDs of the channels the signed-in user follows; empty for guests.
    pub async fn followed_ids(&self) -> ClientResult<Vec<String>> {
        if !self.api.is_signed_in() {
            return Ok(Vec::new());
        }
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::FollowedChannelIds(self.user_key.clone()), || {
                api.following_ids()
            })
            .await
    }

    /// Channels the signed-in user follows; empty for guests.
    pub async fn following(&self) -> ClientResult<Vec<Channel>> {
        if !self.api.is_signed_in() {
            return Ok(Vec::new());
        }
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::Following(self.user_key.clone()), || api.following())
            .await
    }

    /// Profile of the signed-in user.
    pub async fn profile(&self) -> ClientResult<UserProfile> {
        if !self.api.is_signed_in() {
            return Err(ClientError::Unauthorized);
        }
        let api = &self.api;
        self.cache
            .get_or_fetch(QueryKey::Profile(self.user_key.clone()), || api.profile())
            .await
    }

    /// Save profile changes and cache the stored result.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let profile = self.api.update_profile(update).await?;
        self.cache
            .set(QueryKey::Profile(self.user_key.clone()), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Nothing listens here; any request fails with a network error.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn channel(id: &str) -> Channel {
        Channel {
            id: id.to_string(),
            name: id.to_string(),
            youtube_channel_id: None,
            logo_url: None,
            subscribers_count: None,
            followers_count: 0,
            name_key: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fresh_entries_served_without_request() {
        let cache = QueryCache::new();
        cache.set(QueryKey::Channels, vec![channel("c1")]);
        cache.set(
            QueryKey::Summaries {
                feed: SummaryFeed::Explore,
                category: None,
            },
            Vec::<SummaryWithChannel>::new(),
        );
        let queries = Queries::new(ApiClient::new(UNREACHABLE), cache, "guest");

        assert_eq!(queries.channels().await.unwrap()[0].id, "c1");
        // "All" reads the unfiltered entry
        assert!(queries.explore_summaries(Some("All")).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entries_are_refetched() {
        let cache = QueryCache::new();
        cache.set(QueryKey::Channels, vec![channel("c1")]);
        let queries = Queries::new(ApiClient::new(UNREACHABLE), cache.clone(), "guest");

        tokio::time::advance(Duration::from_secs(601)).await;
        let err = queries.channels().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        // The old data is still there for the view.
        assert_eq!(cache.get::<Vec<Channel>>(&QueryKey::Channels).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_forces_feed_refetch() {
        let cache = QueryCache::new();
        let home = QueryKey::Summaries {
            feed: SummaryFeed::Home,
            category: Some("Finance".to_string()),
        };
        cache.set(home.clone(), Vec::<SummaryWithChannel>::new());
        let queries = Queries::new(ApiClient::new(UNREACHABLE), cache.clone(), "guest");

        assert!(queries.home_summaries(Some("Finance")).await.is_ok());
        queries.refresh_summaries();
        assert!(!cache.is_fresh(&home));
        assert!(queries.home_summaries(Some("Finance")).await.is_err());
    }

    #[tokio::test]
    async fn test_guest_has_no_follows_or_profile() {
        let queries = Queries::new(ApiClient::new(UNREACHABLE), QueryCache::new(), "guest");
        assert!(queries.followed_ids().await.unwrap().is_empty());
        assert!(queries.following().await.unwrap().is_empty());
        assert!(matches!(
            queries.profile().await,
            Err(ClientError::Unauthorized)
        ));
    }
}
