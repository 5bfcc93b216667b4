//! Integration tests for the RARITONE storefront.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`.
//! The user/cart service and auth service are replaced by the fakes below;
//! sessions use the same in-memory store as production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p raritone-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

use raritone_core::{Cart, CartLineItem, Identity, Review, UserId};
use raritone_storefront::config::StorefrontConfig;
use raritone_storefront::services::{
    CartService, CartServiceError, IdentityProvider, ReviewBoard, ReviewPublisher,
    ReviewServiceError,
};
use raritone_storefront::state::{AppState, StateParts};

/// Token the fake auth service accepts.
pub const VALID_TOKEN: &str = "token-asha";

/// In-memory stand-in for the user/cart service.
#[derive(Default)]
pub struct FakeCartService {
    pub fail: bool,
    pub calls: AtomicUsize,
    carts: Mutex<HashMap<UserId, Cart>>,
}

impl FakeCartService {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartService for FakeCartService {
    async fn add_to_cart(
        &self,
        user_id: &UserId,
        item: &CartLineItem,
    ) -> Result<(), CartServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CartServiceError::Api {
                status: 503,
                message: "maintenance".to_string(),
            });
        }
        self.carts
            .lock()
            .unwrap()
            .entry(user_id.clone())
            .or_default()
            .items
            .push(item.clone());
        Ok(())
    }

    async fn refresh_cart(&self, user_id: &UserId) -> Result<Cart, CartServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .carts
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Accepts [`VALID_TOKEN`] as user `u1` named Asha.
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn resolve_identity(&self, token: &SecretString) -> Result<Identity, CartServiceError> {
        if token.expose_secret() == VALID_TOKEN {
            Ok(Identity::new("u1", Some("Asha".to_string())))
        } else {
            Err(CartServiceError::Api {
                status: 401,
                message: "invalid token".to_string(),
            })
        }
    }
}

/// Publisher that holds every submission until released.
#[derive(Default)]
pub struct GatedPublisher {
    pub gate: Notify,
}

#[async_trait]
impl ReviewPublisher for GatedPublisher {
    async fn publish(&self, _review: &Review) -> Result<(), ReviewServiceError> {
        self.gate.notified().await;
        Ok(())
    }
}

/// Publisher that accepts immediately, or rejects when `reject` is set.
#[derive(Default)]
pub struct InstantPublisher {
    pub reject: bool,
}

#[async_trait]
impl ReviewPublisher for InstantPublisher {
    async fn publish(&self, _review: &Review) -> Result<(), ReviewServiceError> {
        if self.reject {
            return Err(ReviewServiceError::Rejected("moderation queue full".to_string()));
        }
        Ok(())
    }
}

#[must_use]
pub fn test_config() -> StorefrontConfig {
    let vars: HashMap<String, String> = [
        ("STOREFRONT_BASE_URL", "http://localhost:3000"),
        ("CART_SERVICE_URL", "http://localhost:4000"),
        ("TOAST_DISMISS_MS", "5000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    StorefrontConfig::from_vars(&vars).unwrap()
}

/// Collaborators for one [`TestApp`].
pub struct TestParts {
    pub cart_service: Arc<FakeCartService>,
    pub review_publisher: Arc<dyn ReviewPublisher>,
    pub review_board: Arc<ReviewBoard>,
}

impl Default for TestParts {
    fn default() -> Self {
        Self {
            cart_service: Arc::new(FakeCartService::default()),
            review_publisher: Arc::new(InstantPublisher::default()),
            review_board: Arc::new(ReviewBoard::with_launch_reviews()),
        }
    }
}

/// The storefront router plus one visitor's cookie jar.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    cookie: Arc<Mutex<Option<String>>>,
    pub state: AppState,
    pub cart_service: Arc<FakeCartService>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(TestParts::default())
    }

    #[must_use]
    pub fn with_parts(parts: TestParts) -> Self {
        let state = AppState::from_parts(
            test_config(),
            StateParts {
                cart_service: parts.cart_service.clone(),
                identity_provider: Arc::new(FakeIdentityProvider),
                review_publisher: parts.review_publisher,
                review_board: parts.review_board,
            },
        );

        Self {
            router: raritone_storefront::app(state.clone()),
            cookie: Arc::new(Mutex::new(None)),
            state,
            cart_service: parts.cart_service,
        }
    }

    /// Another visitor on the same server, with an empty cookie jar.
    #[must_use]
    pub fn second_visitor(&self) -> Self {
        Self {
            cookie: Arc::new(Mutex::new(None)),
            ..self.clone()
        }
    }

    /// Send a request and return the raw response, keeping the session cookie.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        self.remember_cookie(&response);
        response
    }

    /// Send a request and decode the JSON body.
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, path, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Sign in as the fake auth service's user.
    pub async fn sign_in(&self) {
        let (status, _) = self
            .post("/auth/session", serde_json::json!({ "token": VALID_TOKEN }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    fn remember_cookie(&self, response: &axum::response::Response) {
        let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        else {
            return;
        };

        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let mut cookie = self.cookie.lock().unwrap();
        if pair.ends_with('=') {
            *cookie = None;
        } else {
            *cookie = Some(pair.to_string());
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Titles of the toasts in an action response.
#[must_use]
pub fn toast_titles(body: &Value) -> Vec<String> {
    body["toasts"]
        .as_array()
        .map(|toasts| {
            toasts
                .iter()
                .filter_map(|toast| toast["title"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
