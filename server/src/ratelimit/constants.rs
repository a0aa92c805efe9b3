//! Rate limiting constants.

use axum::http::header::{HeaderName, RETRY_AFTER};

/// Key pre-allocation size
pub const RECORD_KEY_CAPACITY: usize = 64;

/// Separator after the subject length prefix in record keys
pub const RECORD_KEY_LENGTH_SEPARATOR: char = ':';

/// Separator between the subject and the normalized limit name in record keys
pub const RECORD_KEY_SEPARATOR: char = '_';

/// Replacement for whitespace runs inside limit names
pub const LIMIT_NAME_SEPARATOR: char = '_';

/// IPv6 prefix segments for rate limiting (uses /64)
pub const IPV6_PREFIX_SEGMENTS: usize = 4;

/// Subject prefix used when falling back to the client IP
pub const IP_SUBJECT_PREFIX: &str = "ip:";

/// Response headers (`X-RateLimit-*`, `Retry-After`)
pub const HEADER_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const HEADER_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const HEADER_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
pub const HEADER_RETRY_AFTER: HeaderName = RETRY_AFTER;

/// Milliseconds per second, used for `Retry-After` rounding
pub const MILLIS_PER_SEC: i64 = 1000;

/// Default interval between expired-record sweeps
pub const DEFAULT_SWEEP_SECS: u64 = 600;
