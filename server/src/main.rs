//! Outreach Server - Main Entry Point

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use outreach_server::{
    api,
    config::{self, StoreBackend},
    observability,
    ratelimit::{
        create_redis_client, spawn_sweeper, MemoryStore, RateLimitConfig, RateLimitStore,
        RateLimiter, RedisStore,
    },
    ssrf::UrlPolicy,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    // Initialize tracing
    observability::init(&config.observability);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Outreach Server"
    );

    // Initialize rate limiter (optional)
    let rl_config = RateLimitConfig::from_env();
    let rate_limiter = if rl_config.enabled {
        let store: Arc<dyn RateLimitStore> = match config.store {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .context("REDIS_URL must be set when RATE_LIMIT_STORE=redis")?;
                let redis = create_redis_client(url).await?;
                Arc::new(RedisStore::new(redis, rl_config.key_prefix.clone()))
            }
        };
        info!(store = ?config.store, "Rate limiter initialized");
        Some(RateLimiter::new(store, rl_config))
    } else {
        info!("Rate limiting disabled by configuration");
        None
    };

    let sweeper = match &rate_limiter {
        Some(limiter) if config.has_sweeper() => Some(spawn_sweeper(
            limiter.clone(),
            Duration::from_secs(config.sweep_interval_secs),
        )),
        _ => None,
    };

    // Build application state
    let state = api::AppState::new(config.clone(), rate_limiter, UrlPolicy::from_env());

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("Server shutdown complete");

    Ok(())
}
