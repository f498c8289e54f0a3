// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Device-local library: saved summaries, recently viewed summaries,
//! creators followed without an account, and preferences.
//!
//! Lists are most recent first, unique by ID and capped.

use crate::client::local_store::{keys, LocalStore};
use crate::client::ClientResult;
use crate::models::{Channel, Language, SummaryWithChannel};
use crate::services::GeneratedSummary;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;

pub const MAX_SAVED: usize = 500;
pub const MAX_RECENT: usize = 50;
pub const MAX_FOLLOWED_CREATORS: usize = 500;

/// Display fields of a summary, denormalized into library entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,
    pub title: String,
    pub channel: String,
    #[serde(default)]
    pub channel_logo: Option<String>,
    #[serde(default)]
    pub thumbnail: String,
    pub read_time: u32,
    pub listen_time: u32,
    pub category: String,
}

impl From<&SummaryWithChannel> for LibraryItem {
    fn from(s: &SummaryWithChannel) -> Self {
        Self {
            id: s.summary.id.clone(),
            title: s.summary.title.clone(),
            channel: s
                .channel
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            channel_logo: s.channel.as_ref().and_then(|c| c.logo_url.clone()),
            thumbnail: s.summary.thumbnail.clone().unwrap_or_default(),
            read_time: s.summary.read_time_minutes,
            listen_time: s.summary.listen_time_minutes,
            category: s.summary.category.clone(),
        }
    }
}

impl From<&GeneratedSummary> for LibraryItem {
    fn from(s: &GeneratedSummary) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            channel: s.channel.clone(),
            channel_logo: s.channel_logo.clone(),
            thumbnail: s.thumbnail.clone(),
            read_time: s.read_time,
            listen_time: s.listen_time,
            category: s.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSummary {
    #[serde(flatten)]
    pub item: LibraryItem,
    /// Unix millis
    pub saved_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSummary {
    #[serde(flatten)]
    pub item: LibraryItem,
    /// Unix millis
    pub viewed_at: i64,
}

/// Creator followed on this device (guest mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowedCreator {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Unix millis
    pub followed_at: i64,
}

impl FollowedCreator {
    pub fn from_channel(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            logo_url: channel.logo_url.clone(),
            followed_at: now_millis(),
        }
    }
}

trait Entry {
    fn id(&self) -> &str;
}

impl Entry for SavedSummary {
    fn id(&self) -> &str {
        &self.item.id
    }
}

impl Entry for RecentSummary {
    fn id(&self) -> &str {
        &self.item.id
    }
}

impl Entry for FollowedCreator {
    fn id(&self) -> &str {
        &self.id
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Capped most-recent-first list stored under one key.
#[derive(Clone)]
struct CappedList<T> {
    store: LocalStore,
    key: &'static str,
    cap: usize,
    _entry: PhantomData<fn() -> T>,
}

impl<T: Entry + Serialize + DeserializeOwned> CappedList<T> {
    fn new(store: LocalStore, key: &'static str, cap: usize) -> Self {
        Self {
            store,
            key,
            cap,
            _entry: PhantomData,
        }
    }

    fn load(&self) -> Vec<T> {
        self.store.get(self.key).unwrap_or_default()
    }

    fn contains(&self, id: &str) -> bool {
        self.load().iter().any(|e| e.id() == id)
    }

    /// Insert `entry` at the front, dropping any older entry with its ID.
    fn push_front(&self, entry: T) -> ClientResult<()> {
        let cap = self.cap;
        self.store.update(self.key, |list: &mut Vec<T>| {
            list.retain(|e| e.id() != entry.id());
            list.insert(0, entry);
            list.truncate(cap);
        })
    }

    fn remove(&self, id: &str) -> ClientResult<bool> {
        self.store.update(self.key, |list: &mut Vec<T>| {
            let before = list.len();
            list.retain(|e| e.id() != id);
            list.len() != before
        })
    }

    fn clear(&self) -> ClientResult<()> {
        self.store.set(self.key, &Vec::<T>::new())
    }
}

// ─── Saved ───────────────────────────────────────────────────

/// Summaries the user bookmarked on this device.
#[derive(Clone)]
pub struct SavedSummaries {
    list: CappedList<SavedSummary>,
}

impl SavedSummaries {
    pub fn new(store: LocalStore) -> Self {
        Self {
            list: CappedList::new(store, keys::SAVED_SUMMARIES, MAX_SAVED),
        }
    }

    pub fn list(&self) -> Vec<SavedSummary> {
        self.list.load()
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.list.contains(id)
    }

    /// Save `item`; saving an already-saved item moves it to the front.
    pub fn save(&self, item: LibraryItem) -> ClientResult<()> {
        self.list.push_front(SavedSummary {
            item,
            saved_at: now_millis(),
        })
    }

    pub fn remove(&self, id: &str) -> ClientResult<bool> {
        self.list.remove(id)
    }

    /// Flip the saved state of `item`; returns the new state.
    pub fn toggle(&self, item: LibraryItem) -> ClientResult<bool> {
        if self.is_saved(&item.id) {
            self.remove(&item.id)?;
            Ok(false)
        } else {
            self.save(item)?;
            Ok(true)
        }
    }
}

// ─── Recent ──────────────────────────────────────────────────

/// Summaries recently opened on this device.
#[derive(Clone)]
pub struct RecentSummaries {
    list: CappedList<RecentSummary>,
}

impl RecentSummaries {
    pub fn new(store: LocalStore) -> Self {
        Self {
            list: CappedList::new(store, keys::RECENT_SUMMARIES, MAX_RECENT),
        }
    }

    pub fn list(&self) -> Vec<RecentSummary> {
        self.list.load()
    }

    /// Number of summaries read, as shown on the profile screen.
    pub fn read_count(&self) -> usize {
        self.list.load().len()
    }

    pub fn record(&self, item: LibraryItem) -> ClientResult<()> {
        self.list.push_front(RecentSummary {
            item,
            viewed_at: now_millis(),
        })
    }

    pub fn clear(&self) -> ClientResult<()> {
        self.list.clear()
    }
}

// ─── Followed creators ───────────────────────────────────────

/// Creators followed on this device without an account.
#[derive(Clone)]
pub struct FollowedCreators {
    list: CappedList<FollowedCreator>,
}

impl FollowedCreators {
    pub fn new(store: LocalStore) -> Self {
        Self {
            list: CappedList::new(store, keys::FOLLOWED_CREATORS, MAX_FOLLOWED_CREATORS),
        }
    }

    pub fn list(&self) -> Vec<FollowedCreator> {
        self.list.load()
    }

    pub fn ids(&self) -> Vec<String> {
        self.list.load().into_iter().map(|c| c.id).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list.contains(id)
    }

    pub fn add(&self, creator: FollowedCreator) -> ClientResult<()> {
        self.list.push_front(creator)
    }

    pub fn remove(&self, id: &str) -> ClientResult<bool> {
        self.list.remove(id)
    }
}

// ─── Preferences ─────────────────────────────────────────────

/// Per-device settings.
#[derive(Clone)]
pub struct Preferences {
    store: LocalStore,
}

impl Preferences {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Display language; English until the user picks one.
    pub fn language(&self) -> Language {
        self.store.get(keys::LANGUAGE).unwrap_or_default()
    }

    pub fn set_language(&self, language: Language) -> ClientResult<()> {
        self.store.set(keys::LANGUAGE, &language)
    }

    /// Whether push notifications are enabled; off until opted in.
    pub fn push_notifications(&self) -> bool {
        self.store.get(keys::PUSH_NOTIFICATIONS).unwrap_or(false)
    }

    pub fn set_push_notifications(&self, enabled: bool) -> ClientResult<()> {
        self.store.set(keys::PUSH_NOTIFICATIONS, &enabled)
    }

    pub fn onboarding_completed(&self) -> bool {
        self.store.get(keys::ONBOARDING_COMPLETED).unwrap_or(false)
    }

    pub fn complete_onboarding(&self) -> ClientResult<()> {
        self.store.set(keys::ONBOARDING_COMPLETED, &true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            title: format!("Summary {id}"),
            channel: "Tech Insights".to_string(),
            channel_logo: None,
            thumbnail: String::new(),
            read_time: 3,
            listen_time: 4,
            category: "Technology".to_string(),
        }
    }

    fn ids<T: Entry>(list: &[T]) -> Vec<&str> {
        list.iter().map(|e| e.id()).collect()
    }

    #[test]
    fn test_saving_again_moves_to_front_without_duplicate() {
        let saved = SavedSummaries::new(LocalStore::in_memory());
        saved.save(item("a")).unwrap();
        saved.save(item("b")).unwrap();
        saved.save(item("a")).unwrap();

        assert_eq!(ids(&saved.list()), vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_save() {
        let saved = SavedSummaries::new(LocalStore::in_memory());
        assert!(saved.toggle(item("a")).unwrap());
        assert!(saved.is_saved("a"));
        assert!(!saved.toggle(item("a")).unwrap());
        assert!(!saved.is_saved("a"));
        assert!(!saved.remove("a").unwrap());
    }

    #[test]
    fn test_recents_capped_most_recent_first() {
        let recents = RecentSummaries::new(LocalStore::in_memory());
        for i in 0..60 {
            recents.record(item(&i.to_string())).unwrap();
        }
        recents.record(item("10")).unwrap();

        let list = recents.list();
        assert_eq!(list.len(), MAX_RECENT);
        assert_eq!(list[0].item.id, "10");
        assert_eq!(list[1].item.id, "59");
        assert_eq!(list.iter().filter(|r| r.item.id == "10").count(), 1);

        recents.clear().unwrap();
        assert_eq!(recents.read_count(), 0);
    }

    #[test]
    fn test_entries_use_camel_case_fields() {
        let store = LocalStore::in_memory();
        SavedSummaries::new(store.clone()).save(item("a")).unwrap();
        let raw: serde_json::Value = store.get(keys::SAVED_SUMMARIES).unwrap();
        assert_eq!(raw[0]["readTime"], 3);
        assert!(raw[0]["savedAt"].is_i64());
    }

    #[test]
    fn test_followed_creators() {
        let creators = FollowedCreators::new(LocalStore::in_memory());
        let creator = |id: &str| FollowedCreator {
            id: id.to_string(),
            name: id.to_uppercase(),
            logo_url: None,
            followed_at: 0,
        };
        creators.add(creator("c1")).unwrap();
        creators.add(creator("c2")).unwrap();
        assert_eq!(creators.ids(), vec!["c2", "c1"]);
        assert!(creators.remove("c1").unwrap());
        assert!(!creators.contains("c1"));
    }

    #[test]
    fn test_concurrent_follows_on_device_are_all_kept() {
        let creators = FollowedCreators::new(LocalStore::in_memory());
        let workers: Vec<_> = (0..16)
            .map(|i| {
                let creators = creators.clone();
                std::thread::spawn(move || {
                    creators
                        .add(FollowedCreator {
                            id: format!("c{i}"),
                            name: format!("Creator {i}"),
                            logo_url: None,
                            followed_at: i,
                        })
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut ids = creators.ids();
        ids.sort();
        let mut expected: Vec<_> = (0..16).map(|i| format!("c{i}")).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_preferences_defaults_and_updates() {
        let prefs = Preferences::new(LocalStore::in_memory());
        assert_eq!(prefs.language(), Language::En);
        assert!(!prefs.push_notifications());
        assert!(!prefs.onboarding_completed());

        prefs.set_language(Language::Hi).unwrap();
        prefs.set_push_notifications(true).unwrap();
        prefs.complete_onboarding().unwrap();

        assert_eq!(prefs.language(), Language::Hi);
        assert!(prefs.push_notifications());
        assert!(prefs.onboarding_completed());
    }
}
