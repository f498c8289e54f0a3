// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Channels (creator catalog and follower counts)
//! - Channel followers (user ↔ channel follow relation)
//! - Summaries (published video summaries)
//! - Profiles (user display data)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Channel, ChannelFollower, Profile, Summary};
use firestore::FirestoreConsistencySelector;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
/// Extra rows fetched past a cursor to absorb summaries sharing its timestamp.
const CURSOR_TIE_SLACK: u32 = 25;

/// Position after which the next page of summaries starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQueryCursor {
    /// `created_at` of the last summary on the previous page
    pub created_at: String,
    /// `id` of the last summary on the previous page
    pub id: String,
}

impl SummaryQueryCursor {
    /// Whether `summary` sorts strictly after the cursor (newest first).
    fn is_before(&self, summary: &Summary) -> bool {
        summary.created_at < self.created_at
            || (summary.created_at == self.created_at && summary.id < self.id)
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Channel Operations ──────────────────────────────────────

    /// Get a channel by document ID.
    pub async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHANNELS)
            .obj()
            .one(channel_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get several channels by ID; missing channels are skipped.
    pub async fn get_channels(&self, channel_ids: &[String]) -> Result<Vec<Channel>, AppError> {
        let results = stream::iter(channel_ids.to_vec())
            .map(|id| async move { self.get_channel(&id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<Channel>, AppError>>>()
            .await;

        let mut channels = results
            .into_iter()
            .collect::<Result<Vec<Option<Channel>>, AppError>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        channels.sort_by(|a, b| a.name_key.cmp(&b.name_key));
        Ok(channels)
    }

    /// List all channels, most followed first.
    pub async fn list_channels(&self) -> Result<Vec<Channel>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHANNELS)
            .order_by([(
                "followers_count",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a channel by display name (case-insensitive).
    pub async fn find_channel_by_name(&self, name: &str) -> Result<Option<Channel>, AppError> {
        let name_key = Channel::name_key_for(name);

        let mut matches: Vec<Channel> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CHANNELS)
            .filter(move |q| q.field("name_key").eq(name_key.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.pop())
    }

    /// Create or replace a channel.
    pub async fn upsert_channel(&self, channel: &Channel) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CHANNELS)
            .document_id(&channel.id)
            .object(channel)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create a channel unless its document already exists.
    ///
    /// Returns the stored channel when another writer created it first.
    pub async fn create_channel(&self, channel: &Channel) -> Result<Option<Channel>, AppError> {
        let created: Result<Channel, _> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::CHANNELS)
            .document_id(&channel.id)
            .object(channel)
            .execute()
            .await;

        match created {
            Ok(_) => Ok(None),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                tracing::debug!(channel_id = %channel.id, "Channel already created");
                self.get_channel(&channel.id).await?.map(Some).ok_or_else(|| {
                    AppError::Database(format!("Channel {} vanished after conflict", channel.id))
                })
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    // ─── Follow Operations ───────────────────────────────────────

    /// IDs of the channels a user follows.
    pub async fn list_followed_channel_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let user_id = user_id.to_string();

        let relations: Vec<ChannelFollower> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CHANNEL_FOLLOWERS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(relations.into_iter().map(|r| r.channel_id).collect())
    }

    /// Whether `user_id` follows `channel_id`.
    pub async fn is_following(&self, user_id: &str, channel_id: &str) -> Result<bool, AppError> {
        let relation: Option<ChannelFollower> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHANNEL_FOLLOWERS)
            .obj()
            .one(ChannelFollower::document_id(user_id, channel_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(relation.is_some())
    }

    /// Record a follow and bump the channel's follower count atomically.
    ///
    /// Returns `true` if the relation was created, `false` if it already
    /// existed. Fails with `NotFound` when the channel does not exist.
    pub async fn follow_channel(&self, user_id: &str, channel_id: &str) -> Result<bool, AppError> {
        self.set_following(user_id, channel_id, true).await
    }

    /// Remove a follow and decrement the channel's follower count atomically.
    ///
    /// Returns `true` if a relation was removed, `false` if none existed.
    pub async fn unfollow_channel(
        &self,
        user_id: &str,
        channel_id: &str,
    ) -> Result<bool, AppError> {
        self.set_following(user_id, channel_id, false).await
    }

    async fn set_following(
        &self,
        user_id: &str,
        channel_id: &str,
        follow: bool,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let doc_id = ChannelFollower::document_id(user_id, channel_id);

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read current relation and channel within the transaction
        //    This registers both documents for conflict detection
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let relation: Option<ChannelFollower> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::CHANNEL_FOLLOWERS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read follow in transaction: {}", e))
            })?;
        let channel: Option<Channel> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::CHANNELS)
            .obj()
            .one(channel_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read channel in transaction: {}", e))
            })?;

        let already_following = relation.is_some();
        let channel = match channel {
            Some(c) => c,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("Channel {}", channel_id)));
            }
        };

        // 2. Idempotency: nothing to do if the relation is already in the wanted state
        if already_following == follow {
            tracing::debug!(user_id, channel_id, follow, "Follow state unchanged");
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 3. Relation write
        if follow {
            let relation = ChannelFollower {
                user_id: user_id.to_string(),
                channel_id: channel_id.to_string(),
                created_at: crate::time_utils::now_rfc3339(),
            };
            client
                .fluent()
                .update()
                .in_col(collections::CHANNEL_FOLLOWERS)
                .document_id(&doc_id)
                .object(&relation)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add follow to transaction: {}", e))
                })?;
        } else {
            client
                .fluent()
                .delete()
                .from(collections::CHANNEL_FOLLOWERS)
                .document_id(&doc_id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add unfollow to transaction: {}", e))
                })?;
        }

        // 4. Follower count write
        let mut channel = channel;
        channel.followers_count = if follow {
            channel.followers_count.saturating_add(1)
        } else {
            channel.followers_count.saturating_sub(1)
        };
        client
            .fluent()
            .update()
            .in_col(collections::CHANNELS)
            .document_id(&channel.id)
            .object(&channel)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add channel to transaction: {}", e))
            })?;

        // 5. Commit
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            channel_id,
            follow,
            followers = channel.followers_count,
            "Follow state updated"
        );

        Ok(true)
    }

    // ─── Summary Operations ──────────────────────────────────────

    /// Get a summary by ID.
    pub async fn get_summary(&self, summary_id: &str) -> Result<Option<Summary>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SUMMARIES)
            .obj()
            .one(summary_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List summaries newest first, optionally filtered by category.
    ///
    /// Returns at most `limit` summaries strictly after `cursor`.
    pub async fn list_summaries(
        &self,
        category: Option<&str>,
        cursor: Option<&SummaryQueryCursor>,
        limit: u32,
    ) -> Result<Vec<Summary>, AppError> {
        let category = category.map(str::to_string);
        let cursor_created_at = cursor.map(|c| c.created_at.clone());
        let fetch_limit = if cursor.is_some() {
            limit.saturating_add(CURSOR_TIE_SLACK)
        } else {
            limit
        };

        let results: Vec<Summary> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUMMARIES)
            .filter(move |q| {
                q.for_all([
                    category
                        .clone()
                        .and_then(|c| q.field("category").eq(c)),
                    cursor_created_at
                        .clone()
                        .and_then(|c| q.field("created_at").less_than_or_equal(c)),
                ])
            })
            .order_by([
                ("created_at", firestore::FirestoreQueryDirection::Descending),
                ("id", firestore::FirestoreQueryDirection::Descending),
            ])
            .limit(fetch_limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(results
            .into_iter()
            .filter(|s| cursor.map_or(true, |c| c.is_before(s)))
            .take(limit as usize)
            .collect())
    }

    /// Store a new summary.
    pub async fn insert_summary(&self, summary: &Summary) -> Result<(), AppError> {
        let _: Summary = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::SUMMARIES)
            .document_id(&summary.id)
            .object(summary)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user's stored profile.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user's profile.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
