//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

use crate::ratelimit::DEFAULT_SWEEP_SECS;

/// Backing store for rate limit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process map; records are lost on restart
    Memory,
    /// Redis documents with native expiry
    Redis,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => bail!("RATE_LIMIT_STORE must be 'memory' or 'redis', got '{other}'"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info")
    pub log_level: String,
    /// Output format
    pub log_format: LogFormat,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Rate limit record store
    pub store: StoreBackend,

    /// Redis connection URL (required when `store` is Redis)
    pub redis_url: Option<String>,

    /// Seconds between expired-record sweeps (0 disables the sweeper)
    pub sweep_interval_secs: u64,

    /// Logging
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let store = match env::var("RATE_LIMIT_STORE") {
            Ok(v) => StoreBackend::parse(&v)?,
            Err(_) => StoreBackend::Memory,
        };

        let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty());
        if store == StoreBackend::Redis && redis_url.is_none() {
            bail!("REDIS_URL must be set when RATE_LIMIT_STORE=redis");
        }

        let sweep_interval_secs = match env::var("RATE_LIMIT_SWEEP_SECS") {
            Ok(v) => v
                .trim()
                .parse()
                .context("RATE_LIMIT_SWEEP_SECS must be a non-negative integer")?,
            Err(_) => DEFAULT_SWEEP_SECS,
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            store,
            redis_url,
            sweep_interval_secs,
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
                log_format,
            },
        })
    }

    /// Whether the expired-record sweeper should run.
    #[must_use]
    pub const fn has_sweeper(&self) -> bool {
        self.sweep_interval_secs > 0
    }

    /// Create a default config for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            store: StoreBackend::Memory,
            redis_url: None,
            sweep_interval_secs: 0,
            observability: ObservabilityConfig {
                log_level: "debug".into(),
                log_format: LogFormat::Pretty,
            },
        }
    }
}
