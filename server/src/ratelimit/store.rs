//! Persistent counter storage for the rate limiter.
//!
//! The limiter only needs get-by-key and put-by-key (full overwrite). No
//! transactional guarantee is assumed from a backend.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::ratelimit::RateLimitRecord;

/// Errors raised by a rate limit store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
    /// A stored document could not be encoded or decoded.
    #[error("rate limit record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value document store holding one [`RateLimitRecord`] per key.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Loads the record stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Stores `record` under `key`, replacing any previous value.
    async fn put(&self, key: &str, record: &RateLimitRecord) -> Result<(), StoreError>;

    /// Deletes every record whose `expires_at` is at or before `now_ms`.
    ///
    /// Returns the number of records removed.
    async fn purge_expired(&self, now_ms: i64) -> Result<usize, StoreError>;
}

/// In-process store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, RateLimitRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, record: &RateLimitRecord) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now_ms));
        Ok(before.saturating_sub(self.records.len()))
    }
}
