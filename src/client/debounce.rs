// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Per-key debouncing of async actions.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner<K> {
    next_generation: u64,
    pending: HashMap<K, Pending>,
}

/// Runs an action for a key only after `delay` passes with no newer action
/// scheduled for the same key.
///
/// Keys are independent of each other. Once an action starts running it is
/// no longer cancellable by later schedules.
pub struct Debouncer<K> {
    delay: Duration,
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Arc::new(Mutex::new(Inner {
                next_generation: 0,
                pending: HashMap::new(),
            })),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action` for `key`, superseding any action still waiting.
    ///
    /// The receiver yields the action's output. If this action is later
    /// superseded, the receiver yields `Err(RecvError)` instead.
    pub fn schedule<F, Fut, T>(&self, key: K, action: F) -> oneshot::Receiver<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = inner.next_generation;
        inner.next_generation = inner.next_generation.wrapping_add(1);

        let delay = self.delay;
        let shared = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Leave the map before running so later schedules start a new timer
            // instead of aborting this action.
            {
                let mut inner = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if inner
                    .pending
                    .get(&task_key)
                    .is_some_and(|p| p.generation == generation)
                {
                    inner.pending.remove(&task_key);
                }
            }

            let output = action().await;
            let _ = tx.send(output);
        });

        if let Some(previous) = inner.pending.insert(key, Pending { generation, handle }) {
            previous.handle.abort();
        }

        rx
    }

    /// Drop the waiting action for `key`, if any.
    pub fn cancel(&self, key: &K) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.pending.remove(key) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether an action for `key` is still waiting for its delay.
    pub fn is_pending(&self, key: &K) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .contains_key(key)
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, pending) in inner.pending.drain() {
            pending.handle.abort();
        }
    }
}
