//! Realtime store seam.
//!
//! Models the hosted realtime database the app mirrors state into: wholesale
//! writes, one-shot reads, and live subscriptions that push the full value at
//! a path on every change (and once on subscribe, with the current value).

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StoreError;

/// Path of a user's chat transcript.
pub fn chat_path(user_id: &str) -> String {
    format!("users/{user_id}/chats")
}

/// Path of a user's registration profile record.
pub fn user_path(uid: &str) -> String {
    format!("users/{uid}")
}

/// Backend-agnostic realtime store.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Replace the value at `path` wholesale. Last writer wins.
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// One-shot read of the value at `path`. `None` when the path is empty.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Live subscription to `path`. Delivers the current value immediately
    /// (when one exists), then the full new value on every change, until the
    /// returned handle is cancelled or dropped.
    async fn watch(&self, path: &str) -> Result<StoreSubscription, StoreError>;
}

/// Handle to a live subscription. Dropping it cancels the watcher task, so a
/// conversation switching users cannot keep receiving foreign updates.
pub struct StoreSubscription {
    rx: mpsc::Receiver<Value>,
    task: JoinHandle<()>,
}

impl StoreSubscription {
    pub(crate) fn new(rx: mpsc::Receiver<Value>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    /// Next pushed value, or `None` once the subscription has closed.
    pub async fn next(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Explicitly cancel the subscription.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl tokio_stream::Stream for StoreSubscription {
    type Item = Value;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Value>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
