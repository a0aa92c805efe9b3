//! SSRF Protection
//!
//! Decides whether a user-supplied URL may be fetched from server-side code
//! before any outbound scrape.

pub mod error;
pub mod policy;
pub mod validator;

pub use error::UrlRejection;
pub use policy::{UrlPolicy, DEFAULT_POLICY};
pub use validator::{extract_hostname, is_safe_to_fetch, partition, PartitionedUrls};
