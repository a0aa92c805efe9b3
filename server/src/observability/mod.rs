//! Observability module: structured logging.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # use outreach_server::{config::{LogFormat, ObservabilityConfig}, observability};
//! # let config = ObservabilityConfig {
//! #     log_level: "info".into(),
//! #     log_format: LogFormat::Json,
//! # };
//! // In main(), before any logging:
//! observability::init(&config);
//! ```

pub mod tracing;

pub use self::tracing::init;
