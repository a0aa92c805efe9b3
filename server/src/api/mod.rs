//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{
    config::Config,
    ratelimit::{rate_limit_by_subject, with_category, RateLimitCategory, RateLimiter},
    ssrf::{PartitionedUrls, UrlPolicy},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Rate limiter (optional; `None` disables limiting)
    pub rate_limiter: Option<RateLimiter>,
    /// Host lists for outbound URL checks
    pub url_policy: Arc<UrlPolicy>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, rate_limiter: Option<RateLimiter>, url_policy: UrlPolicy) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter,
            url_policy: Arc::new(url_policy),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    // General API traffic (60 req/60s by default)
    let api_routes = Router::new()
        .route("/api/urls/validate", post(validate_urls))
        .layer(from_fn_with_state(state.clone(), rate_limit_by_subject))
        .layer(from_fn(with_category(RateLimitCategory::Api)));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(api_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether rate limiting is enabled
    rate_limiting: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rate_limiting: state.rate_limiter.is_some(),
    })
}

/// URLs submitted for pre-scrape validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUrlsRequest {
    pub urls: Vec<String>,
    /// Also require a trusted domain
    #[serde(default)]
    pub enforce_allowlist: bool,
}

/// Split submitted URLs into those safe to fetch and the rest.
async fn validate_urls(
    State(state): State<AppState>,
    Json(body): Json<ValidateUrlsRequest>,
) -> Json<PartitionedUrls> {
    debug!(
        count = body.urls.len(),
        enforce_allowlist = body.enforce_allowlist,
        "Validating URLs"
    );

    Json(
        state
            .url_policy
            .partition(body.urls.as_slice(), body.enforce_allowlist),
    )
}
