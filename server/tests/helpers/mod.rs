//! Reusable test helpers for HTTP integration tests.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] when you need stateful middleware testing
//! (rate limiting) instead of `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use outreach_server::api::{create_router, AppState};
use outreach_server::config::Config;
use outreach_server::observability;
use outreach_server::ratelimit::{MemoryStore, RateLimitConfig, RateLimiter, RateLimits};
use outreach_server::ssrf::UrlPolicy;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Router plus the pieces tests inspect directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub limiter: RateLimiter,
}

impl TestApp {
    /// Build an app with rate limiting over a fresh in-memory store.
    pub fn new(limits: RateLimits) -> Self {
        let _ = observability::tracing::try_init(&Config::default_for_test().observability);

        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(
            store.clone(),
            RateLimitConfig {
                limits,
                ..RateLimitConfig::default()
            },
        );
        let state = AppState::new(
            Config::default_for_test(),
            Some(limiter.clone()),
            UrlPolicy::default(),
        );

        Self {
            router: create_router(state),
            store,
            limiter,
        }
    }

    /// Build an app with rate limiting turned off entirely.
    pub fn without_rate_limiting() -> Router {
        let state = AppState::new(Config::default_for_test(), None, UrlPolicy::default());
        create_router(state)
    }

    /// Start building a request.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send one request through a clone of the router.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed to handle request")
    }
}

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a real HTTP server on a random port.
///
/// Use this instead of `oneshot` when testing stateful middleware behavior
/// since requests then carry a real peer address.
///
/// # Example
///
/// ```ignore
/// let app = TestApp::new(RateLimits::default());
/// let server = spawn_test_server(app.router.clone()).await;
///
/// let client = reqwest::Client::new();
/// let resp = client.get(format!("{}/health", server.url)).send().await?;
/// ```
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        handle,
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
