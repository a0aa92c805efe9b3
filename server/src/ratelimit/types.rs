//! Rate limiting types.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Predefined rate limit policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitCategory {
    /// AI text generation requests
    AiGeneration,
    /// Checkout session creation
    Checkout,
    /// General API traffic
    Api,
}

impl RateLimitCategory {
    /// Returns the string identifier for this category (used in logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiGeneration => "ai_generation",
            Self::Checkout => "checkout",
            Self::Api => "api",
        }
    }

    /// Returns all predefined categories.
    pub fn all() -> &'static [RateLimitCategory] {
        &[Self::AiGeneration, Self::Checkout, Self::Api]
    }
}

/// Persisted sliding-window state for one (subject, limit name) pair.
///
/// All timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    /// Caller identity the record belongs to
    pub subject_id: String,
    /// Limit name as supplied by the caller (not normalized)
    pub limit_name: String,
    /// One entry per accepted action still inside the retained window
    pub requests: Vec<i64>,
    /// When the record was first written
    pub created_at: i64,
    /// When the record was last written
    pub last_updated: i64,
    /// Moment after which the record no longer affects any decision
    pub expires_at: i64,
}

impl RateLimitRecord {
    /// Creates a record holding a single accepted action at `now_ms`.
    pub fn first(subject_id: &str, limit_name: &str, now_ms: i64, window_ms: i64) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            limit_name: limit_name.to_string(),
            requests: vec![now_ms],
            created_at: now_ms,
            last_updated: now_ms,
            expires_at: now_ms.saturating_add(window_ms),
        }
    }

    /// Whether the record can be discarded without changing any decision.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// Structured explanation attached to a denied check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDenial {
    /// Name of the limit that denied the action
    pub limit_name: String,
    /// Human-readable message
    pub message: String,
    /// Whole seconds until the window admits another action
    pub retry_after: u64,
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in the window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Epoch milliseconds when the window next admits an action
    pub reset_at_ms: i64,
    /// Present only when `allowed` is false
    pub denial: Option<RateLimitDenial>,
}

impl RateLimitResult {
    /// Builds an allowed result.
    pub const fn allow(limit: u32, remaining: u32, reset_at_ms: i64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            reset_at_ms,
            denial: None,
        }
    }

    /// Reset moment as a UTC timestamp.
    pub fn reset_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.reset_at_ms)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Seconds to wait before retrying (0 if allowed).
    pub fn retry_after(&self) -> u64 {
        self.denial.as_ref().map_or(0, |d| d.retry_after)
    }
}

/// Authenticated caller identity placed in request extensions by the
/// identity layer in front of the rate limited routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject(pub String);

/// Normalized IP address stored in request extensions.
///
/// IPv4 addresses are stored as-is.
/// IPv6 addresses are normalized to /64 prefix for rate limiting.
#[derive(Debug, Clone)]
pub struct NormalizedIp(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = RateLimitRecord::first("user_1", "AI Generation", 1_000, 60_000);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["subjectId"], "user_1");
        assert_eq!(json["limitName"], "AI Generation");
        assert_eq!(json["requests"], serde_json::json!([1_000]));
        assert_eq!(json["createdAt"], 1_000);
        assert_eq!(json["lastUpdated"], 1_000);
        assert_eq!(json["expiresAt"], 61_000);
    }

    #[test]
    fn test_record_expiry() {
        let record = RateLimitRecord::first("u", "api", 0, 100);
        assert!(!record.is_expired(99));
        assert!(record.is_expired(100));
    }

    #[test]
    fn test_reset_at_conversion() {
        let result = RateLimitResult::allow(5, 4, 1_700_000_000_000);
        assert_eq!(result.reset_at().timestamp(), 1_700_000_000);
        assert_eq!(result.retry_after(), 0);
    }

    #[test]
    fn test_category_identifiers() {
        let names: Vec<_> = RateLimitCategory::all().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["ai_generation", "checkout", "api"]);
    }
}
