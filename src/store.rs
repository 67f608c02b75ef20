//! Key-value storage for usage records.
//!
//! The quota tracker only needs `get` and `set` on a single record. Two
//! backends exist: an in-process map for single-instance deployments and a
//! REST blob store shared across instances. Neither offers atomic increments,
//! so concurrent requests for the same key race on read-modify-write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const STORE_TIMEOUT_SECS: u64 = 5;

/// Usage of one hashed identity within its current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub count: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store not configured: {0}")]
    Unconfigured(String),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store returned status {status}")]
    Status { status: u16 },
    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<UsageRecord>, StoreError>;
    async fn set(&self, key: &str, record: &UsageRecord) -> Result<(), StoreError>;
}

// In-process store, records live as long as the process
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, UsageRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<UsageRecord>, StoreError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, record: &UsageRecord) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }
}

/// REST blob store: `GET {base}/{key}` reads a record (404 means none) and
/// `PUT {base}/{key}` writes one as JSON.
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, StoreError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::Unconfigured(format!(
                "store url must be http(s), got '{base_url}'"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Unconfigured(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl UsageStore for HttpBlobStore {
    async fn get(&self, key: &str) -> Result<Option<UsageRecord>, StoreError> {
        let res = self
            .authorize(self.client.get(self.url(key)))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(StoreError::Status {
                status: res.status().as_u16(),
            });
        }

        let body = res
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn set(&self, key: &str, record: &UsageRecord) -> Result<(), StoreError> {
        let res = self
            .authorize(self.client.put(self.url(key)))
            .json(record)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !res.status().is_success() {
            return Err(StoreError::Status {
                status: res.status().as_u16(),
            });
        }
        Ok(())
    }
}
