//! Rate limiting error types for HTTP responses.

use axum::http::header::HeaderValue;
use axum::http::HeaderMap;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use serde::Serialize;
use thiserror::Error;

use crate::ratelimit::{
    RateLimitResult, HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET, HEADER_RETRY_AFTER,
};

/// Errors that can occur during rate limit checks.
///
/// Store failures never surface here: the limiter fails open instead.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The caller identity was empty.
    #[error("rate limit subject must not be empty")]
    InvalidSubject,
    /// The limit configuration violates its invariants.
    #[error("invalid rate limit configuration: {0}")]
    InvalidConfig(String),
    /// Request exceeded the rate limit.
    #[error("rate limit exceeded")]
    LimitExceeded(RateLimitResult),
}

/// JSON response body for rate limit denials.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests (always 0 when rate limited).
    pub remaining: u32,
    /// RFC 3339 timestamp when the window next admits a request.
    pub reset: String,
    /// Seconds to wait before retrying.
    pub retry_after: u64,
}

/// Writes the `X-RateLimit-*` headers describing `result`.
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    let reset = result.reset_at().to_rfc3339_opts(SecondsFormat::Millis, true);
    if let Ok(v) = HeaderValue::from_str(&result.limit.to_string()) {
        headers.insert(HEADER_LIMIT, v);
    }
    if let Ok(v) = HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert(HEADER_REMAINING, v);
    }
    if let Ok(v) = HeaderValue::from_str(&reset) {
        headers.insert(HEADER_RESET, v);
    }
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidSubject => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid_subject"})),
            )
                .into_response(),
            Self::InvalidConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "internal_error"})),
            )
                .into_response(),
            Self::LimitExceeded(result) => {
                let retry_after = result.retry_after();
                let message = result.denial.as_ref().map_or_else(
                    || format!("Too many requests. Wait {retry_after} seconds."),
                    |d| d.message.clone(),
                );
                let body = RateLimitErrorResponse {
                    error: message,
                    limit: result.limit,
                    remaining: 0,
                    reset: result.reset_at().to_rfc3339_opts(SecondsFormat::Millis, true),
                    retry_after,
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                let headers = response.headers_mut();
                apply_rate_limit_headers(headers, &result);
                headers.insert(HEADER_REMAINING, HeaderValue::from_static("0"));
                if let Ok(v) = HeaderValue::from_str(&retry_after.to_string()) {
                    headers.insert(HEADER_RETRY_AFTER, v);
                }
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::RateLimitDenial;
    use http_body_util::BodyExt;

    fn denied_result() -> RateLimitResult {
        RateLimitResult {
            allowed: false,
            limit: 5,
            remaining: 0,
            reset_at_ms: 1_700_000_000_000,
            denial: Some(RateLimitDenial {
                limit_name: "AI Generation".to_string(),
                message: "Rate limit exceeded for AI Generation. Try again in 42 seconds."
                    .to_string(),
                retry_after: 42,
            }),
        }
    }

    #[tokio::test]
    async fn test_limit_exceeded_response() {
        let response = RateLimitError::LimitExceeded(denied_result()).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers[HEADER_LIMIT], "5");
        assert_eq!(headers[HEADER_REMAINING], "0");
        assert_eq!(headers[HEADER_RESET], "2023-11-14T22:13:20.000Z");
        assert_eq!(headers[HEADER_RETRY_AFTER], "42");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["error"],
            "Rate limit exceeded for AI Generation. Try again in 42 seconds."
        );
        assert_eq!(body["limit"], 5);
        assert_eq!(body["remaining"], 0);
        assert_eq!(body["reset"], "2023-11-14T22:13:20.000Z");
        assert_eq!(body["retryAfter"], 42);
    }

    #[test]
    fn test_invalid_subject_is_bad_request() {
        let response = RateLimitError::InvalidSubject.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
