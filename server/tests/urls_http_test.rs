//! HTTP tests for the URL validation endpoint.

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use helpers::{body_to_json, TestApp};
use outreach_server::ratelimit::RateLimits;
use serde_json::json;

fn validate_request(payload: &serde_json::Value) -> axum::http::Request<Body> {
    TestApp::request(Method::POST, "/api/urls/validate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_partition_without_allowlist() {
    let app = TestApp::new(RateLimits::default());

    let resp = app
        .oneshot(validate_request(&json!({
            "urls": [
                "https://github.com/someone",
                "http://github.com/someone",
                "https://example.com/about",
                "https://169.254.169.254/latest/meta-data",
                "https://printer.local/",
                "not a url"
            ]
        })))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_to_json(resp).await;
    assert_eq!(
        body,
        json!({
            "valid": ["https://github.com/someone", "https://example.com/about"],
            "invalid": [
                "http://github.com/someone",
                "https://169.254.169.254/latest/meta-data",
                "https://printer.local/",
                "not a url"
            ]
        })
    );
}

#[tokio::test]
async fn test_partition_with_allowlist() {
    let app = TestApp::new(RateLimits::default());

    let resp = app
        .oneshot(validate_request(&json!({
            "urls": [
                "https://www.linkedin.com/in/someone",
                "https://example.com/about",
                "https://someone.substack.com/p/post"
            ],
            "enforceAllowlist": true
        })))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_to_json(resp).await;
    assert_eq!(
        body["valid"],
        json!([
            "https://www.linkedin.com/in/someone",
            "https://someone.substack.com/p/post"
        ])
    );
    assert_eq!(body["invalid"], json!(["https://example.com/about"]));
}

#[tokio::test]
async fn test_empty_list() {
    let app = TestApp::new(RateLimits::default());

    let resp = app.oneshot(validate_request(&json!({ "urls": [] }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(resp).await,
        json!({ "valid": [], "invalid": [] })
    );
}

#[tokio::test]
async fn test_missing_urls_field_rejected() {
    let app = TestApp::new(RateLimits::default());

    let resp = app
        .oneshot(validate_request(&json!({ "enforceAllowlist": true })))
        .await;
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_oneshot_without_peer_falls_back_to_loopback_subject() {
    let app = TestApp::new(RateLimits::default());

    let resp = app.oneshot(validate_request(&json!({ "urls": [] }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-ratelimit-remaining"], "59");
    assert_eq!(app.store.len(), 1);
}
