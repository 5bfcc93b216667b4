//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /auth/session           - Exchange an auth-service token for a session identity
//! POST /auth/logout            - Forget the identity and destroy the session
//!
//! # Cart
//! GET  /cart                   - Current cart (remote when signed in, otherwise local)
//! POST /cart/add               - Add a line item
//!
//! # Wishlist
//! GET  /wishlist               - Saved product ids
//! POST /wishlist/toggle        - Flip one product
//! GET  /wishlist/events        - SSE stream of this visitor's wishlist changes
//!
//! # Reviews
//! GET  /reviews                - Reviews (most recent first) and summary
//! POST /reviews                - Submit the review draft
//! GET  /reviews/draft          - Saved draft and whether a submission is in flight
//! POST /reviews/{id}/helpful   - Count a helpful vote
//! ```
//!
//! Workflow actions answer with an [`ActionResponse`] carrying the toasts the
//! request produced.

pub mod auth;
pub mod cart;
pub mod reviews;
pub mod wishlist;

use std::fmt::Display;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use raritone_core::ToastNotification;

use crate::services::ToastQueue;
use crate::state::AppState;
use crate::workflows::{CartError, ReviewError, WishlistError};

/// Body of every workflow action response.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
    pub toasts: Vec<ToastNotification>,
    pub dismiss_after_ms: u64,
}

/// A workflow error that maps onto an HTTP status.
pub trait WorkflowFailure: Display {
    fn status(&self) -> StatusCode;
}

impl WorkflowFailure for CartError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidItem(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Service(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl WorkflowFailure for WishlistError {
    fn status(&self) -> StatusCode {
        match self {
            Self::EmptyProductId => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl WorkflowFailure for ReviewError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MissingRating | Self::MissingComment => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SubmissionInFlight => StatusCode::CONFLICT,
            Self::Service(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Build the response for a finished workflow action.
///
/// Server-side failure details stay in the logs.
pub fn action_response<T, E>(toasts: &ToastQueue, outcome: Result<T, E>) -> Response
where
    T: Serialize,
    E: WorkflowFailure,
{
    let (status, result, error) = match outcome {
        Ok(result) => (StatusCode::OK, Some(result), None),
        Err(err) => {
            let status = err.status();
            let message = if status.is_server_error() {
                tracing::error!(error = %err, "workflow failed");
                status.canonical_reason().unwrap_or("Server error").to_string()
            } else {
                err.to_string()
            };
            (status, None, Some(message))
        }
    };

    let body = ActionResponse {
        result,
        error,
        toasts: toasts.active(),
        dismiss_after_ms: u64::try_from(toasts.dismiss_after().as_millis()).unwrap_or(u64::MAX),
    };
    (status, Json(body)).into_response()
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(auth::sign_in))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/events", get(wishlist::events))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::index).post(reviews::submit))
        .route("/draft", get(reviews::draft))
        .route("/{id}/helpful", post(reviews::mark_helpful))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/reviews", review_routes())
}
