//! Cart route handlers.
//!
//! Signed-in shoppers read and write their server-side cart. Everyone else
//! gets a cart keyed by their session handle.

use axum::{
    Json,
    extract::State,
    response::Response,
};
use serde::Serialize;
use tracing::instrument;

use raritone_core::{Cart, CartLineItem, Price};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, Visitor};
use crate::routes::action_response;
use crate::state::AppState;
use crate::workflows::{AddToCartWorkflow, CartTarget};

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub subtotal: Price,
    pub subtotal_display: String,
    /// Whether the cart is held by the user/cart service.
    pub remote: bool,
}

impl CartView {
    fn new(cart: Cart, remote: bool) -> Self {
        let subtotal = cart.subtotal();
        Self {
            item_count: cart.item_count(),
            subtotal_display: subtotal.display(),
            subtotal,
            items: cart.items,
            remote,
        }
    }
}

/// Display the current cart.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Visitor(handle): Visitor,
) -> Result<Json<CartView>> {
    let view = match CartTarget::resolve(identity, handle) {
        CartTarget::Remote(identity) => {
            CartView::new(state.cart_service().refresh_cart(&identity.id).await?, true)
        }
        CartTarget::Local(handle) => CartView::new(state.local_carts().get(&handle).await, false),
    };
    Ok(Json(view))
}

/// Add an item to the cart.
#[instrument(skip_all, fields(product_id = %item.product_id))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Visitor(handle): Visitor,
    Json(item): Json<CartLineItem>,
) -> Response {
    let product_id = item.product_id.clone();
    let target = CartTarget::resolve(identity, handle);
    let toasts = state.toast_queue();
    let workflow = AddToCartWorkflow::new(state.cart_service(), state.local_carts(), &toasts);
    let outcome = workflow.add_to_cart(&target, item).await;

    if outcome.is_ok() {
        add_breadcrumb(
            "cart",
            "Added item to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
    }

    action_response(&toasts, outcome)
}
