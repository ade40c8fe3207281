//! In-process realtime store over a broadcast channel per path.
//!
//! Backs tests and local development; the live app points at the hosted
//! store. Semantics mirror the remote one: wholesale writes, subscribers get
//! the current value on subscribe and the full new value on every write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast, mpsc};

use super::{RealtimeStore, StoreSubscription};
use crate::error::StoreError;

const BROADCAST_CAPACITY: usize = 64;
const SUBSCRIPTION_CAPACITY: usize = 16;

/// In-memory store keyed by path.
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
    watchers: RwLock<HashMap<String, broadcast::Sender<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            values: RwLock::new(HashMap::new()),
            watchers: RwLock::new(HashMap::new()),
        })
    }

    async fn sender_for(&self, path: &str) -> broadcast::Sender<Value> {
        let mut watchers = self.watchers.write().await;
        watchers
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut values = self.values.write().await;
            values.insert(path.to_string(), value.clone());
        }
        // Ok if nobody is listening.
        let _ = self.sender_for(path).await.send(value);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let values = self.values.read().await;
        Ok(values.get(path).cloned())
    }

    async fn watch(&self, path: &str) -> Result<StoreSubscription, StoreError> {
        // Subscribe before snapshotting so a write landing in between is
        // delivered rather than lost.
        let mut broadcast_rx = self.sender_for(path).await.subscribe();
        let current = self.get(path).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);

        let task = tokio::spawn(async move {
            if let Some(value) = current {
                if tx.send(value).await.is_err() {
                    return;
                }
            }
            loop {
                match broadcast_rx.recv().await {
                    Ok(value) => {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(StoreSubscription::new(rx, task))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = MemoryStore::new();
        store
            .put("users/u1/chats", json!([{"role": "system", "content": "hi"}]))
            .await
            .unwrap();
        let value = store.get("users/u1/chats").await.unwrap().unwrap();
        assert_eq!(value[0]["role"], "system");
    }

    #[tokio::test]
    async fn get_missing_path_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("users/nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn watch_delivers_current_value_immediately() {
        let store = MemoryStore::new();
        store.put("k", json!(1)).await.unwrap();

        let mut sub = store.watch("k").await.unwrap();
        assert_eq!(sub.next().await, Some(json!(1)));
    }

    #[tokio::test]
    async fn watch_delivers_each_overwrite() {
        let store = MemoryStore::new();
        let mut sub = store.watch("k").await.unwrap();

        store.put("k", json!("a")).await.unwrap();
        store.put("k", json!("b")).await.unwrap();

        assert_eq!(sub.next().await, Some(json!("a")));
        assert_eq!(sub.next().await, Some(json!("b")));
    }

    #[tokio::test]
    async fn cancelled_subscription_stops_delivering() {
        let store = MemoryStore::new();
        let sub = store.watch("k").await.unwrap();
        sub.cancel();

        // Write after cancel must not panic or leak a task that holds the
        // receiver open.
        store.put("k", json!("late")).await.unwrap();
    }

    #[tokio::test]
    async fn watchers_on_different_paths_are_independent() {
        let store = MemoryStore::new();
        let mut sub_a = store.watch("a").await.unwrap();

        store.put("b", json!("other")).await.unwrap();
        store.put("a", json!("mine")).await.unwrap();

        assert_eq!(sub_a.next().await, Some(json!("mine")));
    }
}
