//! Axum middleware for rate limiting.
//!
//! The policy for a route group is chosen with [`with_category`]; the
//! subject is the authenticated caller when the identity layer supplied
//! one, otherwise the normalized client IP.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::debug;

use crate::api::AppState;
use crate::ratelimit::{
    apply_rate_limit_headers, extract_client_ip, ip_subject, normalize_ip, AuthSubject,
    NormalizedIp, RateLimitCategory, RateLimitError,
};

/// Middleware to rate limit requests by caller identity.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/api/generate", post(generate))
///     .layer(from_fn_with_state(state.clone(), rate_limit_by_subject))
///     .layer(from_fn(with_category(RateLimitCategory::AiGeneration)))
/// ```
///
/// # Behavior
///
/// - If rate limiter is not configured (`state.rate_limiter` is `None`), requests pass through.
/// - Store outages are absorbed by the limiter (fail open).
/// - If the rate limit is exceeded, returns `429 Too Many Requests` with retry information.
/// - Allowed responses carry the `X-RateLimit-*` headers.
#[tracing::instrument(skip(state, request, next))]
pub async fn rate_limit_by_subject(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let category = request
        .extensions()
        .get::<RateLimitCategory>()
        .copied()
        .unwrap_or(RateLimitCategory::Api);

    let Some(ref rate_limiter) = state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let subject = if let Some(auth) = request.extensions().get::<AuthSubject>() {
        auth.0.clone()
    } else {
        // Absent when the router is not served with connect info (e.g. `oneshot`)
        let connect_info = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .cloned();
        let trust_proxy = rate_limiter.config().trust_proxy;
        let client_ip = extract_client_ip(request.headers(), connect_info.as_ref(), trust_proxy);
        let normalized_ip = normalize_ip(client_ip);
        let subject = ip_subject(&normalized_ip);

        request.extensions_mut().insert(NormalizedIp(normalized_ip));
        subject
    };

    debug!(
        category = %category.as_str(),
        subject = %subject,
        "Checking rate limit"
    );

    let result = rate_limiter.check_category(category, &subject).await?;

    if !result.allowed {
        return Err(RateLimitError::LimitExceeded(result));
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &result);
    Ok(response)
}

/// Sets the rate limit category for downstream middleware.
///
/// Apply as the outer layer so it runs before [`rate_limit_by_subject`].
pub fn with_category(
    category: RateLimitCategory,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    move |mut request: Request, next: Next| {
        request.extensions_mut().insert(category);
        Box::pin(async move { next.run(request).await })
    }
}
