//! Wishlist route handlers.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use raritone_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::Visitor;
use crate::routes::action_response;
use crate::state::AppState;
use crate::workflows::{WishlistView, toggle_wishlist};

/// SSE event name for wishlist changes.
pub const WISHLIST_CHANGED_EVENT: &str = "wishlist-changed";

#[derive(Debug, Serialize)]
pub struct WishlistEntries {
    pub entries: Vec<ProductId>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

/// List saved product ids.
#[instrument(skip_all, fields(visitor = %handle))]
pub async fn show(
    State(state): State<AppState>,
    Visitor(handle): Visitor,
) -> Result<Json<WishlistEntries>> {
    let slots = state.preferences().for_visitor(&handle).await;
    let view = WishlistView::mount(&*slots, handle).await?;

    Ok(Json(WishlistEntries {
        entries: view.wishlist().entries().to_vec(),
    }))
}

/// Flip one product in the wishlist.
///
/// Toggles from the same visitor run one at a time, so overlapping requests
/// each see the set the previous one saved.
#[instrument(skip_all, fields(visitor = %handle, product_id = %request.product_id))]
pub async fn toggle(
    State(state): State<AppState>,
    Visitor(handle): Visitor,
    Json(request): Json<ToggleRequest>,
) -> Response {
    let slots = state.preferences().for_visitor(&handle).await;
    let toasts = state.toast_queue();
    let _writer = slots.exclusive().await;
    let outcome = toggle_wishlist(
        &*slots,
        handle,
        &request.product_id,
        &toasts,
        state.wishlist_signal(),
    )
    .await;

    if outcome.is_ok() {
        add_breadcrumb(
            "wishlist",
            "Toggled wishlist item",
            Some(&[("product_id", request.product_id.as_str())]),
        );
    }

    action_response(&toasts, outcome)
}

/// Stream this visitor's wishlist changes.
///
/// Only changes made after the stream opens are sent.
pub async fn events(
    State(state): State<AppState>,
    Visitor(handle): Visitor,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut subscription = state.wishlist_signal().subscribe();

    let stream = async_stream::stream! {
        while let Some(change) = subscription.recv().await {
            if change.owner != handle {
                continue;
            }
            match Event::default().event(WISHLIST_CHANGED_EVENT).json_data(&change) {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::warn!(error = %e, "failed to encode wishlist event"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
