// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Query cache shared by the client data layer.
//!
//! Entries are type-erased and keyed by [`QueryKey`]. Each key family has a
//! stale time; stale entries are still readable (for optimistic updates and
//! instant rendering) but [`QueryCache::get_or_fetch`] refetches them.

use dashmap::DashMap;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const ONE_HOUR: Duration = Duration::from_secs(60 * 60);
const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

/// Which screen a summary list feeds; they refresh at different rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryFeed {
    Home,
    Explore,
}

/// Cache key of one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Summaries {
        feed: SummaryFeed,
        category: Option<String>,
    },
    Summary(String),
    Channels,
    Channel(String),
    FollowedChannelIds(String),
    Following(String),
    Profile(String),
}

/// Group of keys invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Summaries,
    Summary,
    Channels,
    FollowedChannelIds,
    Following,
    Profile,
}

impl QueryKey {
    pub fn family(&self) -> QueryFamily {
        match self {
            QueryKey::Summaries { .. } => QueryFamily::Summaries,
            QueryKey::Summary(_) => QueryFamily::Summary,
            QueryKey::Channels | QueryKey::Channel(_) => QueryFamily::Channels,
            QueryKey::FollowedChannelIds(_) => QueryFamily::FollowedChannelIds,
            QueryKey::Following(_) => QueryFamily::Following,
            QueryKey::Profile(_) => QueryFamily::Profile,
        }
    }

    /// How long fetched data counts as fresh.
    pub fn stale_time(&self) -> Duration {
        match self {
            QueryKey::Summaries {
                feed: SummaryFeed::Home,
                ..
            } => ONE_HOUR,
            _ => TEN_MINUTES,
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Shared, cloneable query cache.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, fresh or not.
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    /// Whether `key` holds data that has not gone stale.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(key.stale_time()))
    }

    /// Store freshly fetched data.
    pub fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Rewrite cached data in place without touching its freshness.
    ///
    /// Returns `false` when nothing of type `T` is cached under `key`.
    pub fn update<T, F>(&self, key: &QueryKey, f: F) -> bool
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T),
    {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return false;
        };
        let Some(current) = entry.value.downcast_ref::<T>() else {
            return false;
        };
        let mut next = current.clone();
        f(&mut next);
        entry.value = Arc::new(next);
        true
    }

    /// Mark one key stale.
    pub fn invalidate_key(&self, key: &QueryKey) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Mark every key of `family` stale.
    pub fn invalidate(&self, family: QueryFamily) {
        let mut count = 0usize;
        for mut entry in self.entries.iter_mut() {
            if entry.key().family() == family {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(?family, count, "Invalidated queries");
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Fresh cached data, or the result of `fetch` (which is then cached).
    ///
    /// Failed fetches leave the existing entry untouched.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.is_fresh(&key) {
            if let Some(value) = self.get::<T>(&key) {
                return Ok(value);
            }
        }

        tracing::debug!(?key, "Fetching query");
        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }
}
