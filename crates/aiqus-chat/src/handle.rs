// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handles returned to the caller of a streamed request.

use std::time::Duration;

use aiqus_core::{AiqusError, SessionRecord};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Aborts an in-flight request. Cloning shares the same underlying signal.
///
/// Cancelling is idempotent and safe after the request has finished.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A request running on the tokio runtime.
#[derive(Debug)]
pub struct ChatHandle {
    session: SessionRecord,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl ChatHandle {
    pub(crate) fn new(session: SessionRecord, cancel: CancelHandle, task: JoinHandle<()>) -> Self {
        Self {
            session,
            cancel,
            task,
        }
    }

    /// Snapshot of the session record as dispatched: ids, model, and query,
    /// with an empty answer.
    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancels the request once `deadline` has elapsed, unless it was
    /// cancelled earlier.
    pub fn cancel_after(&self, deadline: Duration) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(deadline) => cancel.cancel(),
            }
        });
    }

    /// Waits for the request task; all callbacks have fired once this returns.
    pub async fn join(self) -> Result<(), AiqusError> {
        self.task
            .await
            .map_err(|e| AiqusError::Internal(format!("chat task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent_and_shared() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fires_at_deadline() {
        let session = SessionRecord::new("q", Default::default(), "m", vec![], None);
        let cancel = CancelHandle::new();
        let waiter = cancel.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });
        let handle = ChatHandle::new(session, cancel.clone(), task);

        handle.cancel_after(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(!cancel.is_cancelled());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cancel.is_cancelled());
        handle.join().await.unwrap();
    }
}
