//! `tracing-subscriber` initialization.
//!
//! Installs a layered registry with an [`EnvFilter`] and a stdout fmt layer,
//! JSON by default.

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, ObservabilityConfig};

/// Builds the filter: `RUST_LOG` when set, otherwise `config.log_level` with
/// noisy transport crates capped.
fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=off,h2=off", config.log_level))
    })
}

/// Builds the layered subscriber shared by [`init`] and [`try_init`].
fn build_subscriber(config: &ObservabilityConfig) -> impl Subscriber + Send + Sync + 'static {
    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    Registry::default()
        .with(build_filter(config))
        .with(fmt_layer)
}

/// Install the global `tracing` subscriber.
///
/// Call once, before anything logs. A second call panics inside
/// `tracing-subscriber`; use [`try_init`] where that can happen.
pub fn init(config: &ObservabilityConfig) {
    build_subscriber(config).init();
}

/// Like [`init`], but returns `false` instead of panicking when a global
/// subscriber is already installed.
pub fn try_init(config: &ObservabilityConfig) -> bool {
    build_subscriber(config).try_init().is_ok()
}
