// SPDX-License-Identifier: MIT
// Copyright 2026 The VidSum Authors

//! Optimistic changes with compensation.

use std::future::Future;

/// A local change applied ahead of its remote confirmation.
///
/// Holds the compensation for the change. Confirming discards it; failing
/// or dropping the value unconfirmed runs it.
#[must_use = "an unsettled change is rolled back when dropped"]
pub struct Tentative<U: FnOnce()> {
    undo: Option<U>,
}

impl<U: FnOnce()> Tentative<U> {
    /// Run `apply` now and remember `undo`.
    pub fn apply<A: FnOnce()>(apply: A, undo: U) -> Self {
        apply();
        Self { undo: Some(undo) }
    }

    /// Track a change the caller has already made.
    pub fn applied(undo: U) -> Self {
        Self { undo: Some(undo) }
    }

    /// Keep the change.
    pub fn confirm(mut self) {
        self.undo = None;
    }

    /// Revert the change.
    pub fn compensate(mut self) {
        if let Some(undo) = self.undo.take() {
            undo();
        }
    }

    /// Await `commit`, keeping the change on success and reverting it on error.
    pub async fn settle<T, E, Fut>(self, commit: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        match commit.await {
            Ok(value) => {
                self.confirm();
                Ok(value)
            }
            Err(e) => {
                self.compensate();
                Err(e)
            }
        }
    }
}

impl<U: FnOnce()> Drop for Tentative<U> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_settle_success_keeps_change() {
        let state = Cell::new(0);
        let change = Tentative::apply(|| state.set(1), || state.set(0));
        assert_eq!(state.get(), 1);

        let result = change.settle(async { Ok::<_, ()>("saved") }).await;
        assert_eq!(result, Ok("saved"));
        assert_eq!(state.get(), 1);
    }

    #[tokio::test]
    async fn test_settle_failure_reverts() {
        let state = Cell::new(0);
        let change = Tentative::apply(|| state.set(1), || state.set(0));

        let result = change.settle(async { Err::<(), _>("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(state.get(), 0);
    }

    #[test]
    fn test_drop_without_confirm_reverts() {
        let state = Cell::new(5);
        {
            let _change = Tentative::applied(|| state.set(4));
        }
        assert_eq!(state.get(), 4);

        let change = Tentative::applied(|| state.set(3));
        change.confirm();
        assert_eq!(state.get(), 4);
    }
}
