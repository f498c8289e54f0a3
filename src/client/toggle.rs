// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Debounced, optimistic on/off relations (follow a channel, and similar).
//!
//! The caller reflects every toggle in its local view immediately. The
//! remote write happens once the entity has been quiet for the debounce
//! window, and only if the final wanted state differs from the last state
//! the backend confirmed. A failed write restores the confirmed state.

use crate::client::debounce::Debouncer;
use crate::client::optimistic::Tentative;
use crate::client::ClientResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Quiet period before a toggle is written.
pub const TOGGLE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Remote store of an on/off relation keyed by entity ID.
pub trait RelationBackend: Send + Sync + 'static {
    /// Persist the relation state for `id`. Must be idempotent.
    fn set(&self, id: &str, on: bool) -> impl Future<Output = ClientResult<()>> + Send;
}

/// How a scheduled toggle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The backend now holds this state.
    Written(bool),
    /// The wanted state already matched the backend; nothing was sent.
    Unchanged(bool),
    /// The write failed and the view was restored to this state.
    RolledBack(bool),
    /// A later toggle for the same entity replaced this one.
    Superseded,
}

impl ToggleOutcome {
    /// Whether the toggle ended without error.
    pub fn is_ok(self) -> bool {
        !matches!(self, ToggleOutcome::RolledBack(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct EntityState {
    /// Last state the backend acknowledged
    confirmed: bool,
    /// State the view currently shows
    desired: bool,
    /// Bumped on every toggle
    version: u64,
}

type States = Arc<Mutex<HashMap<String, EntityState>>>;

/// Coalesces toggles per entity into at most one write per quiet period.
pub struct ToggleSync<B> {
    backend: Arc<B>,
    states: States,
    debouncer: Debouncer<String>,
}

impl<B: RelationBackend> ToggleSync<B> {
    pub fn new(backend: B) -> Self {
        Self::with_delay(backend, TOGGLE_DEBOUNCE)
    }

    pub fn with_delay(backend: B, delay: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            states: Arc::new(Mutex::new(HashMap::new())),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Record that `id` should become `desired`.
    ///
    /// `current` is the state the view showed before this toggle; it seeds
    /// the confirmed state when the entity has no write in flight.
    /// `restore` is called with the confirmed state if the write fails.
    pub fn set<R>(&self, id: &str, current: bool, desired: bool, restore: R) -> Receiver
    where
        R: FnOnce(bool) + Send + 'static,
    {
        {
            let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = states.entry(id.to_string()).or_insert(EntityState {
                confirmed: current,
                desired: current,
                version: 0,
            });
            entry.desired = desired;
            entry.version = entry.version.wrapping_add(1);
        }

        let backend = Arc::clone(&self.backend);
        let states = Arc::clone(&self.states);
        let id = id.to_string();

        let rx = self
            .debouncer
            .schedule(id.clone(), move || fire(backend, states, id, restore));
        Receiver { rx }
    }

    /// Whether any toggle has not settled yet.
    pub fn in_flight(&self) -> bool {
        !self
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Whether a toggle for `id` is waiting for its quiet period.
    pub fn is_pending(&self, id: &str) -> bool {
        self.debouncer.is_pending(&id.to_string())
    }
}

async fn fire<B, R>(backend: Arc<B>, states: States, id: String, restore: R) -> ToggleOutcome
where
    B: RelationBackend,
    R: FnOnce(bool) + Send + 'static,
{
    let (wanted, confirmed, version) = {
        let mut guard = states.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(state) = guard.get(&id).copied() else {
            return ToggleOutcome::Superseded;
        };
        if state.desired == state.confirmed {
            guard.remove(&id);
            tracing::debug!(id = %id, on = state.confirmed, "Toggle back at confirmed state, skipping write");
            return ToggleOutcome::Unchanged(state.confirmed);
        }
        (state.desired, state.confirmed, state.version)
    };

    let rollback = Tentative::applied(move || restore(confirmed));
    let result = backend.set(&id, wanted).await;

    let mut guard = states.lock().unwrap_or_else(PoisonError::into_inner);
    // A toggle made while the write was in flight has its own timer.
    let newer = guard.get(&id).is_some_and(|s| s.version != version);

    match result {
        Ok(()) => {
            rollback.confirm();
            if let Some(entry) = guard.get_mut(&id) {
                entry.confirmed = wanted;
            }
            if !newer {
                guard.remove(&id);
            }
            tracing::debug!(id = %id, on = wanted, "Toggle written");
            ToggleOutcome::Written(wanted)
        }
        Err(e) => {
            tracing::warn!(id = %id, on = wanted, error = %e, "Toggle write failed");
            if newer {
                rollback.confirm();
            } else {
                guard.remove(&id);
                drop(guard);
                rollback.compensate();
            }
            ToggleOutcome::RolledBack(confirmed)
        }
    }
}

/// Outcome of one scheduled toggle.
pub struct Receiver {
    rx: oneshot::Receiver<ToggleOutcome>,
}

impl Receiver {
    /// Wait for the toggle to settle.
    pub async fn outcome(self) -> ToggleOutcome {
        self.rx.await.unwrap_or(ToggleOutcome::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Clone, Default)]
    struct RecordingBackend {
        writes: Arc<Mutex<Vec<(String, bool)>>>,
        fail: Arc<AtomicBool>,
    }

    impl RelationBackend for RecordingBackend {
        fn set(&self, id: &str, on: bool) -> impl Future<Output = ClientResult<()>> + Send {
            let writes = Arc::clone(&self.writes);
            let fail = self.fail.load(Ordering::SeqCst);
            let id = id.to_string();
            async move {
                if fail {
                    return Err(ClientError::Network("offline".to_string()));
                }
                writes.lock().unwrap().push((id, on));
                Ok(())
            }
        }
    }

    fn no_restore(_: bool) {}

    #[tokio::test(start_paused = true)]
    async fn test_odd_toggles_write_final_state_once() {
        let backend = RecordingBackend::default();
        let sync = ToggleSync::new(backend.clone());

        let first = sync.set("c1", false, true, no_restore);
        let second = sync.set("c1", true, false, no_restore);
        let third = sync.set("c1", false, true, no_restore);

        assert_eq!(third.outcome().await, ToggleOutcome::Written(true));
        assert_eq!(first.outcome().await, ToggleOutcome::Superseded);
        assert_eq!(second.outcome().await, ToggleOutcome::Superseded);
        assert_eq!(
            *backend.writes.lock().unwrap(),
            vec![("c1".to_string(), true)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_even_toggles_skip_write() {
        let backend = RecordingBackend::default();
        let sync = ToggleSync::new(backend.clone());

        let _ = sync.set("c1", false, true, no_restore);
        let last = sync.set("c1", true, false, no_restore);

        assert_eq!(last.outcome().await, ToggleOutcome::Unchanged(false));
        assert!(backend.writes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_restores_confirmed_state() {
        let backend = RecordingBackend::default();
        backend.fail.store(true, Ordering::SeqCst);
        let sync = ToggleSync::new(backend.clone());

        let restored = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&restored);
        let rx = sync.set("c1", false, true, move |state| {
            *slot.lock().unwrap() = Some(state);
        });

        assert_eq!(rx.outcome().await, ToggleOutcome::RolledBack(false));
        assert_eq!(*restored.lock().unwrap(), Some(false));
        assert!(!sync.is_pending("c1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entities_are_independent() {
        let backend = RecordingBackend::default();
        let sync = ToggleSync::new(backend.clone());

        let a = sync.set("a", false, true, no_restore);
        let b = sync.set("b", true, false, no_restore);

        assert_eq!(a.outcome().await, ToggleOutcome::Written(true));
        assert_eq!(b.outcome().await, ToggleOutcome::Written(false));
        assert_eq!(backend.writes.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_toggle_compares_against_confirmed_write() {
        let backend = RecordingBackend::default();
        let sync = ToggleSync::new(backend.clone());

        let rx = sync.set("c1", false, true, no_restore);
        assert_eq!(rx.outcome().await, ToggleOutcome::Written(true));

        // Follow was confirmed; toggling off then on again is a no-op.
        let _ = sync.set("c1", true, false, no_restore);
        let rx = sync.set("c1", false, true, no_restore);
        assert_eq!(rx.outcome().await, ToggleOutcome::Unchanged(true));
        assert_eq!(backend.writes.lock().unwrap().len(), 1);
    }
}
