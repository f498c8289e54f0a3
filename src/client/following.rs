// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Follow / unfollow with optimistic cache updates.
//!
//! Signed-in users follow through the API ([`RemoteFollows`]); guests keep
//! follows on the device ([`LocalFollows`]). Either way the follow button
//! flips immediately and the write is debounced by [`ToggleSync`].
//!
//! The current state is read from the followed-IDs query, which is loaded
//! before the first toggle.

use crate::client::api::ApiClient;
use crate::client::cache::{QueryCache, QueryFamily, QueryKey};
use crate::client::library::{FollowedCreator, FollowedCreators};
use crate::client::toggle::{RelationBackend, ToggleOutcome, ToggleSync};
use crate::client::ClientResult;
use crate::models::Channel;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Follows stored by the API for the signed-in user.
#[derive(Clone)]
pub struct RemoteFollows {
    api: ApiClient,
}

impl RemoteFollows {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Where a user's follows live.
pub trait FollowStore: RelationBackend {
    /// IDs of every followed channel.
    fn followed_ids(&self) -> impl Future<Output = ClientResult<Vec<String>>> + Send;
}

impl FollowStore for RemoteFollows {
    fn followed_ids(&self) -> impl Future<Output = ClientResult<Vec<String>>> + Send {
        let api = self.api.clone();
        async move {
            if !api.is_signed_in() {
                return Ok(Vec::new());
            }
            api.following_ids().await
        }
    }
}

impl RelationBackend for RemoteFollows {
    fn set(&self, id: &str, on: bool) -> impl Future<Output = ClientResult<()>> + Send {
        let api = self.api.clone();
        let id = id.to_string();
        async move {
            let response = api.set_following(&id, on).await?;
            if !response.changed {
                tracing::debug!(channel_id = %id, following = on, "Follow state already stored");
            }
            Ok(())
        }
    }
}

/// Follows kept on this device for guests.
#[derive(Clone)]
pub struct LocalFollows {
    creators: FollowedCreators,
    cache: QueryCache,
}

impl LocalFollows {
    /// `cache` supplies the channel name and logo stored with each follow.
    pub fn new(creators: FollowedCreators, cache: QueryCache) -> Self {
        Self { creators, cache }
    }

    pub fn creators(&self) -> &FollowedCreators {
        &self.creators
    }

    fn creator(&self, id: &str) -> FollowedCreator {
        match cached_channel(&self.cache, id) {
            Some(channel) => FollowedCreator::from_channel(&channel),
            None => FollowedCreator {
                id: id.to_string(),
                name: id.to_string(),
                logo_url: None,
                followed_at: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

impl FollowStore for LocalFollows {
    fn followed_ids(&self) -> impl Future<Output = ClientResult<Vec<String>>> + Send {
        std::future::ready(Ok(self.creators.ids()))
    }
}

impl RelationBackend for LocalFollows {
    fn set(&self, id: &str, on: bool) -> impl Future<Output = ClientResult<()>> + Send {
        let result = if on {
            if self.creators.contains(id) {
                Ok(())
            } else {
                self.creators.add(self.creator(id))
            }
        } else {
            self.creators.remove(id).map(|_| ())
        };
        std::future::ready(result)
    }
}

fn cached_channel(cache: &QueryCache, id: &str) -> Option<Channel> {
    cache
        .get::<Channel>(&QueryKey::Channel(id.to_string()))
        .or_else(|| {
            cache
                .get::<Vec<Channel>>(&QueryKey::Channels)?
                .into_iter()
                .find(|c| c.id == id)
        })
}

/// Follow state of one user, backed by the query cache.
pub struct FollowController<B> {
    user_key: String,
    cache: QueryCache,
    sync: ToggleSync<B>,
}

impl<B: FollowStore> FollowController<B> {
    /// `user_key` scopes the per-user cache entries (a user ID, or a fixed
    /// key for guests).
    pub fn new(user_key: impl Into<String>, cache: QueryCache, backend: B) -> Self {
        Self {
            user_key: user_key.into(),
            cache,
            sync: ToggleSync::new(backend),
        }
    }

    pub fn with_delay(
        user_key: impl Into<String>,
        cache: QueryCache,
        backend: B,
        delay: Duration,
    ) -> Self {
        Self {
            user_key: user_key.into(),
            cache,
            sync: ToggleSync::with_delay(backend, delay),
        }
    }

    /// Cache key of the followed channel IDs.
    pub fn ids_key(&self) -> QueryKey {
        QueryKey::FollowedChannelIds(self.user_key.clone())
    }

    /// Whether the view currently shows `channel_id` as followed.
    pub fn is_following(&self, channel_id: &str) -> bool {
        self.cache
            .get::<Vec<String>>(&self.ids_key())
            .is_some_and(|ids| ids.iter().any(|id| id == channel_id))
    }

    /// Whether a follow change for `channel_id` has not been written yet.
    pub fn is_pending(&self, channel_id: &str) -> bool {
        self.sync.is_pending(channel_id)
    }

    /// Followed channel IDs, from the cache while fresh.
    ///
    /// While a toggle is unsettled the cached list holds optimistic state
    /// and is returned as is.
    pub async fn followed_ids(&self) -> ClientResult<Vec<String>> {
        let key = self.ids_key();
        if self.sync.in_flight() {
            if let Some(ids) = self.cache.get::<Vec<String>>(&key) {
                return Ok(ids);
            }
        }
        let backend = self.sync.backend();
        self.cache.get_or_fetch(key, || backend.followed_ids()).await
    }

    /// Flip the follow state of `channel_id`.
    pub async fn toggle(&self, channel_id: &str) -> ClientResult<JoinHandle<ToggleOutcome>> {
        let ids = self.followed_ids().await?;
        let current = ids.iter().any(|id| id == channel_id);
        Ok(self.schedule(channel_id, current, !current))
    }

    /// Show `channel_id` as followed (or not) now and schedule the write.
    ///
    /// The handle resolves once the write settles. A failed write puts the
    /// cache back to the last confirmed state.
    pub async fn set_following(
        &self,
        channel_id: &str,
        follow: bool,
    ) -> ClientResult<JoinHandle<ToggleOutcome>> {
        let ids = self.followed_ids().await?;
        let current = ids.iter().any(|id| id == channel_id);
        Ok(self.schedule(channel_id, current, follow))
    }

    fn schedule(&self, channel_id: &str, current: bool, follow: bool) -> JoinHandle<ToggleOutcome> {
        reflect(&self.cache, &self.user_key, channel_id, follow);

        let cache = self.cache.clone();
        let user_key = self.user_key.clone();
        let id = channel_id.to_string();
        let rx = self.sync.set(channel_id, current, follow, move |confirmed| {
            reflect(&cache, &user_key, &id, confirmed);
        });

        let cache = self.cache.clone();
        tokio::spawn(async move {
            let outcome = rx.outcome().await;
            if let ToggleOutcome::Written(_) = outcome {
                cache.invalidate(QueryFamily::FollowedChannelIds);
                cache.invalidate(QueryFamily::Following);
                cache.invalidate(QueryFamily::Channels);
            }
            outcome
        })
    }
}

/// Make every cached view agree that `user_key` does (or does not) follow
/// `channel_id`. Applying the same state twice changes nothing.
fn reflect(cache: &QueryCache, user_key: &str, channel_id: &str, follow: bool) {
    let ids_key = QueryKey::FollowedChannelIds(user_key.to_string());
    let was_following = cache
        .get::<Vec<String>>(&ids_key)
        .is_some_and(|ids| ids.iter().any(|id| id == channel_id));
    if was_following == follow {
        return;
    }

    let updated = cache.update::<Vec<String>, _>(&ids_key, |ids| {
        if follow {
            ids.push(channel_id.to_string());
        } else {
            ids.retain(|id| id != channel_id);
        }
    });
    if !updated && follow {
        // Nothing fetched yet; keep the optimistic entry but let the next
        // read refetch it.
        cache.set(ids_key.clone(), vec![channel_id.to_string()]);
        cache.invalidate_key(&ids_key);
    }

    let adjust = |channel: &mut Channel| {
        channel.followers_count = if follow {
            channel.followers_count.saturating_add(1)
        } else {
            channel.followers_count.saturating_sub(1)
        };
    };

    cache.update::<Vec<Channel>, _>(&QueryKey::Channels, |channels| {
        if let Some(channel) = channels.iter_mut().find(|c| c.id == channel_id) {
            adjust(channel);
        }
    });
    cache.update::<Channel, _>(&QueryKey::Channel(channel_id.to_string()), adjust);

    let following_key = QueryKey::Following(user_key.to_string());
    if follow {
        if let Some(channel) = cached_channel(cache, channel_id) {
            cache.update::<Vec<Channel>, _>(&following_key, |channels| {
                if !channels.iter().any(|c| c.id == channel_id) {
                    channels.insert(0, channel);
                }
            });
        }
    } else {
        cache.update::<Vec<Channel>, _>(&following_key, |channels| {
            channels.retain(|c| c.id != channel_id);
        });
    }
}
