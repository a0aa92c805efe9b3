//! Rate limiting module for protecting privileged actions.
//!
//! Sliding-window limits backed by a persistent counter store, for AI
//! generation, checkout, and general API traffic.

pub mod config;
pub mod constants;
pub mod error;
pub mod ip;
pub mod limiter;
pub mod middleware;
pub mod redis_store;
pub mod store;
pub mod sweeper;
pub mod types;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use ip::*;
pub use limiter::*;
pub use middleware::{rate_limit_by_subject, with_category};
pub use redis_store::{create_redis_client, RedisStore};
pub use store::*;
pub use sweeper::spawn_sweeper;
pub use types::*;
