//! Add-to-cart over HTTP.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use raritone_integration_tests::{FakeCartService, TestApp, TestParts, toast_titles};

fn tee(quantity: u32) -> Value {
    json!({
        "product_id": "tee-black",
        "name": "AI Fit Tee",
        "unit_price": { "amount": "1299.00", "currency_code": "INR" },
        "quantity": quantity,
        "size": "M",
        "color_or_image_ref": "black"
    })
}

#[tokio::test]
async fn test_anonymous_add_uses_session_cart() {
    let app = TestApp::new();

    let (status, body) = app.post("/cart/add", tee(2)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["cart"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["result"]["follow_ups"], json!(["view_cart", "checkout"]));
    assert!(body["toasts"].as_array().unwrap().is_empty());
    assert_eq!(app.cart_service.call_count(), 0);

    let (status, cart) = app.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["remote"], false);
    assert_eq!(cart["subtotal_display"], "₹2598.00");
}

#[tokio::test]
async fn test_session_carts_are_separate() {
    let app = TestApp::new();
    let other = app.second_visitor();

    app.post("/cart/add", tee(1)).await;

    let (_, cart) = other.get("/cart").await;
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn test_signed_in_add_uses_cart_service() {
    let app = TestApp::new();
    app.sign_in().await;

    let (status, body) = app.post("/cart/add", tee(1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["cart"]["items"][0]["product_id"], "tee-black");
    assert_eq!(app.cart_service.call_count(), 2);

    let (_, cart) = app.get("/cart").await;
    assert_eq!(cart["remote"], true);
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
async fn test_cart_service_failure_reports_one_error_toast() {
    let app = TestApp::with_parts(TestParts {
        cart_service: Arc::new(FakeCartService::failing()),
        ..TestParts::default()
    });
    app.sign_in().await;

    let (status, body) = app.post("/cart/add", tee(1)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["result"].is_null());
    assert_eq!(toast_titles(&body), ["Error"]);
    assert_eq!(body["toasts"][0]["kind"], "error");
    assert_eq!(body["dismiss_after_ms"], 5000);
    assert_eq!(app.cart_service.call_count(), 1);
}

#[tokio::test]
async fn test_zero_quantity_rejected() {
    let app = TestApp::new();

    let (status, body) = app.post("/cart/add", tee(0)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(toast_titles(&body), ["Invalid Selection"]);
    let (_, cart) = app.get("/cart").await;
    assert_eq!(cart["item_count"], 0);
}
