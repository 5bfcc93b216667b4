//! RARITONE storefront library.
//!
//! Serves the shopper-facing workflows: add to cart, wishlist toggle and
//! review submission. The router is built here so integration tests can drive
//! it in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod workflows;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tower_sessions::MemoryStore;

use crate::state::AppState;

/// Build the storefront router with its session, request id and tracing
/// layers.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(MemoryStore::default(), state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
