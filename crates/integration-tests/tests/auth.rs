//! Session sign-in, logout and health.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use raritone_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_sign_in_with_invalid_token() {
    let app = TestApp::new();

    let (status, body) = app.post("/auth/session", json!({ "token": "nope" })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid session token");
}

#[tokio::test]
async fn test_logout_reverts_to_local_cart() {
    let app = TestApp::new();
    app.sign_in().await;
    let (_, cart) = app.get("/cart").await;
    assert_eq!(cart["remote"], true);

    let (status, _) = app.post("/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = app.get("/cart").await;
    assert_eq!(cart["remote"], false);
}
