// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Device-scoped key-value store persisted as one JSON file.

use crate::client::{ClientError, ClientResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Stored keys.
pub mod keys {
    pub const LANGUAGE: &str = "language";
    pub const PUSH_NOTIFICATIONS: &str = "push-notifications";
    pub const SAVED_SUMMARIES: &str = "vidsum-saved-summaries";
    pub const RECENT_SUMMARIES: &str = "recentSummaries";
    pub const FOLLOWED_CREATORS: &str = "vidsum-followed-creators";
    pub const ONBOARDING_COMPLETED: &str = "onboarding-completed";

    /// Key of a cached translation.
    pub fn translation(summary_id: &str, language: &str) -> String {
        format!("translation:{}:{}", summary_id, language)
    }
}

/// Key-value store shared by the library lists, preferences and caches.
///
/// Values are JSON. Every write rewrites the file; reads are served from
/// memory.
#[derive(Clone)]
pub struct LocalStore {
    path: Option<PathBuf>,
    values: Arc<Mutex<Map<String, Value>>>,
}

impl LocalStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store; an unreadable or corrupt one is
    /// logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Map<String, Value>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt local store, starting empty");
                Map::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable local store, starting empty");
                Map::new()
            }
        };

        Self {
            path: Some(path),
            values: Arc::new(Mutex::new(values)),
        }
    }

    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Arc::new(Mutex::new(Map::new())),
        }
    }

    /// Value under `key`; `None` if absent or not decodable as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;

        serde_json::from_value(value)
            .map_err(|e| tracing::warn!(key, error = %e, "Ignoring undecodable local value"))
            .ok()
    }

    /// Store `value` under `key`.
    ///
    /// Memory is only updated once the file write succeeds.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        let value = serde_json::to_value(value).map_err(|e| ClientError::Storage(e.to_string()))?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> ClientResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    /// Read-modify-write the value under `key` while holding the store lock.
    ///
    /// An absent or undecodable value starts from `T::default()`. Nothing is
    /// written when `f` leaves the value unchanged.
    pub fn update<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> R) -> ClientResult<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let current = values.get(key).cloned();
        let mut typed: T = current
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        let result = f(&mut typed);

        let value = serde_json::to_value(&typed).map_err(|e| ClientError::Storage(e.to_string()))?;
        if current.as_ref() == Some(&value) {
            return Ok(result);
        }
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(result)
    }

    fn persist(&self, values: &Map<String, Value>) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let raw = serde_json::to_vec_pretty(values).map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, raw)
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "Failed to write local store");
                ClientError::Storage(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = LocalStore::open(&path);
        store.set(keys::LANGUAGE, &"hi").unwrap();
        store.set(keys::PUSH_NOTIFICATIONS, &true).unwrap();
        store.remove(keys::PUSH_NOTIFICATIONS).unwrap();

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get::<String>(keys::LANGUAGE).as_deref(), Some("hi"));
        assert_eq!(reopened.get::<bool>(keys::PUSH_NOTIFICATIONS), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = LocalStore::open(&path);
        assert_eq!(store.get::<String>(keys::LANGUAGE), None);
        store.set(keys::LANGUAGE, &"en").unwrap();
        assert_eq!(
            LocalStore::open(&path).get::<String>(keys::LANGUAGE).as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let store = LocalStore::in_memory();
        store.set(keys::ONBOARDING_COMPLETED, &"yes").unwrap();
        assert_eq!(store.get::<bool>(keys::ONBOARDING_COMPLETED), None);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("missing").join("store.json"));

        assert!(store.set(keys::LANGUAGE, &"hi").is_err());
        assert_eq!(store.get::<String>(keys::LANGUAGE), None);

        let appended = store.update(keys::RECENT_SUMMARIES, |list: &mut Vec<String>| {
            list.push("s1".to_string())
        });
        assert!(appended.is_err());
        assert_eq!(store.get::<Vec<String>>(keys::RECENT_SUMMARIES), None);
    }

    #[test]
    fn test_concurrent_updates_keep_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("store.json"));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        store
                            .update(keys::SAVED_SUMMARIES, |list: &mut Vec<String>| {
                                list.push(format!("{i}-{j}"))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let stored: Vec<String> = store.get(keys::SAVED_SUMMARIES).unwrap();
        assert_eq!(stored.len(), 80);
        let reopened: Vec<String> = LocalStore::open(dir.path().join("store.json"))
            .get(keys::SAVED_SUMMARIES)
            .unwrap();
        assert_eq!(reopened.len(), 80);
    }

    #[test]
    fn test_translation_key() {
        assert_eq!(keys::translation("s1", "hi"), "translation:s1:hi");
    }
}
