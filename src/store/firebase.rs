//! Firebase Realtime Database REST backend.
//!
//! Writes are `PUT {base}/{path}.json` with the full value (wholesale
//! replace), reads are `GET {base}/{path}.json`. The live subscription is a
//! polling watcher that emits the full value whenever it differs from the
//! last one seen; the initial poll emits the current value.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use super::{RealtimeStore, StoreSubscription};
use crate::config::FirebaseConfig;
use crate::error::StoreError;

const SUBSCRIPTION_CAPACITY: usize = 16;

/// REST client for the hosted realtime database.
#[derive(Clone)]
pub struct FirebaseStore {
    client: reqwest::Client,
    database_url: String,
    poll_interval: Duration,
}

impl FirebaseStore {
    pub fn new(config: &FirebaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Read {
                path: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            database_url: config.database_url.clone(),
            poll_interval: Duration::from_secs(2),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.database_url, path.trim_matches('/'))
    }

    async fn fetch(client: &reqwest::Client, url: &str) -> Result<Option<Value>, StoreError> {
        let response = client.get(url).send().await.map_err(|e| StoreError::Read {
            path: url.to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(StoreError::Read {
                path: url.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let value: Value = response.json().await.map_err(|e| StoreError::Read {
            path: url.to_string(),
            reason: e.to_string(),
        })?;

        // The database returns JSON `null` for an absent path.
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

#[async_trait]
impl RealtimeStore for FirebaseStore {
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let url = self.url(path);
        let response = self
            .client
            .put(&url)
            .json(&value)
            .send()
            .await
            .map_err(|e| StoreError::Write {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Write {
                path: path.to_string(),
                reason: format!("status {}", response.status()),
            });
        }
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Self::fetch(&self.client, &self.url(path)).await
    }

    async fn watch(&self, path: &str) -> Result<StoreSubscription, StoreError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let client = self.client.clone();
        let url = self.url(path);
        let poll_interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut last: Option<Value> = None;
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                match Self::fetch(&client, &url).await {
                    Ok(Some(value)) => {
                        if last.as_ref() != Some(&value) {
                            last = Some(value.clone());
                            if tx.send(value).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // Transient poll failure; keep the subscription alive.
                        warn!(url = %url, error = %e, "store poll failed");
                    }
                }
            }
        });

        Ok(StoreSubscription::new(rx, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> FirebaseStore {
        FirebaseStore::new(&FirebaseConfig {
            database_url: base.to_string(),
            api_key: "test".into(),
            storage_bucket: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn url_appends_json_suffix() {
        let s = store("https://example.firebaseio.com");
        assert_eq!(
            s.url("users/u1/chats"),
            "https://example.firebaseio.com/users/u1/chats.json"
        );
    }

    #[test]
    fn url_trims_leading_slash() {
        let s = store("https://example.firebaseio.com");
        assert_eq!(s.url("/users/u1"), "https://example.firebaseio.com/users/u1.json");
    }
}
