//! Core sliding-window rate limiter.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ratelimit::{
    LimitConfig, RateLimitCategory, RateLimitConfig, RateLimitDenial, RateLimitError,
    RateLimitRecord, RateLimitResult, RateLimitStore, StoreError, LIMIT_NAME_SEPARATOR,
    MILLIS_PER_SEC, RECORD_KEY_CAPACITY, RECORD_KEY_LENGTH_SEPARATOR, RECORD_KEY_SEPARATOR,
};

/// Normalizes a limit name so incidental casing or spacing differences map
/// to the same record.
///
/// Trims, lower-cases, and collapses every whitespace run into a single `_`.
pub fn normalize_limit_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name.split_whitespace().enumerate() {
        if i > 0 {
            out.push(LIMIT_NAME_SEPARATOR);
        }
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Builds the store key for a (subject, limit name) pair.
///
/// Layout is `{subject byte length}:{subject}_{normalized name}`. The length
/// prefix keeps keys distinct when the subject or name contains `_`.
pub fn record_key(subject_id: &str, limit_name: &str) -> String {
    let mut key = String::with_capacity(RECORD_KEY_CAPACITY);
    key.push_str(&subject_id.len().to_string());
    key.push(RECORD_KEY_LENGTH_SEPARATOR);
    key.push_str(subject_id);
    key.push(RECORD_KEY_SEPARATOR);
    key.push_str(&normalize_limit_name(limit_name));
    key
}

/// Sliding-window rate limiter over a persistent counter store.
///
/// Each check is a plain read-modify-write with no cross-request locking.
/// Store failures fail open.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: Arc<RateLimitConfig>,
}

impl RateLimiter {
    /// Creates a new rate limiter over `store`.
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Checks one of the predefined policies for `subject_id`.
    pub async fn check_category(
        &self,
        category: RateLimitCategory,
        subject_id: &str,
    ) -> Result<RateLimitResult, RateLimitError> {
        let limit = self.config.limits.get(category).clone();
        self.check(subject_id, &limit).await
    }

    /// Checks and records an action for `subject_id` under `limit`.
    ///
    /// # Errors
    /// Returns `InvalidSubject` or `InvalidConfig` for caller mistakes. Store
    /// failures are never returned; the action is allowed instead.
    pub async fn check(
        &self,
        subject_id: &str,
        limit: &LimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        self.check_at(subject_id, limit, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Same as [`check`](Self::check) with an explicit clock reading.
    #[tracing::instrument(skip(self, limit), fields(limit = %limit.name))]
    pub async fn check_at(
        &self,
        subject_id: &str,
        limit: &LimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, RateLimitError> {
        if subject_id.is_empty() {
            return Err(RateLimitError::InvalidSubject);
        }
        limit.validate()?;

        let window_ms = limit.window_ms_i64();
        if !self.config.enabled {
            return Ok(RateLimitResult::allow(
                limit.max_requests,
                limit.max_requests,
                now_ms.saturating_add(window_ms),
            ));
        }

        let key = record_key(subject_id, &limit.name);
        match self.evaluate(&key, subject_id, limit, now_ms).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    error = %e,
                    limit = %limit.name,
                    subject = %subject_id,
                    "Rate limit store unavailable, allowing request (fail open)"
                );
                Ok(RateLimitResult::allow(
                    limit.max_requests,
                    limit.max_requests,
                    now_ms.saturating_add(window_ms),
                ))
            }
        }
    }

    /// Runs the sliding-window decision against the store.
    async fn evaluate(
        &self,
        key: &str,
        subject_id: &str,
        limit: &LimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, StoreError> {
        let window_ms = limit.window_ms_i64();
        let window_start = now_ms.saturating_sub(window_ms);

        let Some(mut record) = self.store.get(key).await? else {
            let record = RateLimitRecord::first(subject_id, &limit.name, now_ms, window_ms);
            self.store.put(key, &record).await?;
            debug!(key = %key, "Created rate limit record");
            return Ok(RateLimitResult::allow(
                limit.max_requests,
                limit.max_requests - 1,
                now_ms.saturating_add(window_ms),
            ));
        };

        record.requests.retain(|&ts| ts > window_start);
        let count = u32::try_from(record.requests.len()).unwrap_or(u32::MAX);

        if count >= limit.max_requests {
            let oldest = record.requests.iter().copied().min().unwrap_or(now_ms);
            let reset_at_ms = oldest.saturating_add(window_ms);
            let retry_after = retry_after_secs(reset_at_ms, now_ms);
            debug!(
                key = %key,
                count = count,
                retry_after = retry_after,
                "Rate limit exceeded"
            );
            return Ok(RateLimitResult {
                allowed: false,
                limit: limit.max_requests,
                remaining: 0,
                reset_at_ms,
                denial: Some(RateLimitDenial {
                    limit_name: limit.name.clone(),
                    message: format!(
                        "Rate limit exceeded for {}. Try again in {retry_after} seconds.",
                        limit.name
                    ),
                    retry_after,
                }),
            });
        }

        record.requests.push(now_ms);
        record.last_updated = now_ms;
        record.expires_at = now_ms.saturating_add(window_ms);
        self.store.put(key, &record).await?;

        let new_count = count + 1;
        Ok(RateLimitResult::allow(
            limit.max_requests,
            limit.max_requests.saturating_sub(new_count),
            now_ms.saturating_add(window_ms),
        ))
    }

    /// Deletes records whose whole window has elapsed.
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        self.purge_expired_at(chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Same as [`purge_expired`](Self::purge_expired) with an explicit clock reading.
    pub async fn purge_expired_at(&self, now_ms: i64) -> Result<usize, StoreError> {
        self.store.purge_expired(now_ms).await
    }

    /// Returns the configuration for this rate limiter.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// `ceil((reset_at - now) / 1000)`, never negative.
fn retry_after_secs(reset_at_ms: i64, now_ms: i64) -> u64 {
    let remaining_ms = reset_at_ms.saturating_sub(now_ms).max(0);
    remaining_ms.saturating_add(MILLIS_PER_SEC - 1) as u64 / MILLIS_PER_SEC as u64
}
