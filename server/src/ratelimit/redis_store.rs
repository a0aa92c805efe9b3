//! Redis-backed rate limit store.
//!
//! Each record is a JSON document written with a `PX` expiry matching its
//! remaining lifetime, so Redis drops idle records on its own.

use async_trait::async_trait;
use fred::prelude::*;
use tracing::info;

use crate::ratelimit::{RateLimitRecord, RateLimitStore, StoreError};

/// Connects a Redis client and waits for the connection to be ready.
pub async fn create_redis_client(redis_url: &str) -> Result<Client, Error> {
    let config = Config::from_url(redis_url)?;
    let client = Client::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;

    info!("Connected to Redis");
    Ok(client)
}

/// Rate limit store persisting records in Redis.
#[derive(Clone)]
pub struct RedisStore {
    redis: Client,
    key_prefix: String,
}

impl RedisStore {
    /// Wraps an already connected client.
    pub fn new(redis: Client, key_prefix: impl Into<String>) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.into(),
        }
    }

    /// Builds a Redis key with the configured prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

fn unavailable(e: &Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let raw: Option<String> = self
            .redis
            .get(self.build_key(key))
            .await
            .map_err(|e| unavailable(&e))?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, record: &RateLimitRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let ttl_ms = (record.expires_at - record.last_updated).max(1);

        self.redis
            .set::<(), _, _>(
                self.build_key(key),
                json,
                Some(Expiration::PX(ttl_ms)),
                None,
                false,
            )
            .await
            .map_err(|e| unavailable(&e))
    }

    async fn purge_expired(&self, _now_ms: i64) -> Result<usize, StoreError> {
        // Keys carry their own PX expiry.
        Ok(0)
    }
}
