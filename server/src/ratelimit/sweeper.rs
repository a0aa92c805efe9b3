//! Periodic removal of rate limit records whose window has fully elapsed.
//!
//! Decisions never depend on this: stale timestamps are filtered on every
//! check. The sweep only bounds storage growth.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ratelimit::RateLimiter;

/// Spawns a background task purging expired records every `interval`.
///
/// The task runs until the returned handle is aborted. Failures are logged
/// and the next tick retries.
pub fn spawn_sweeper(limiter: RateLimiter, interval: Duration) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Rate limit sweeper started");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match limiter.purge_expired().await {
                Ok(0) => debug!("Rate limit sweep found nothing to remove"),
                Ok(removed) => info!(removed = removed, "Purged expired rate limit records"),
                Err(e) => warn!(error = %e, "Rate limit sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ratelimit::{LimitConfig, MemoryStore, RateLimitConfig};

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_on_tick() {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());
        let limit = LimitConfig::new("api", 5, 1_000).unwrap();

        // Already expired relative to the wall clock
        limiter.check_at("u1", &limit, 0).await.unwrap();
        assert_eq!(store.len(), 1);

        let handle = spawn_sweeper(limiter, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(store.is_empty());
        handle.abort();
    }
}
