//! Session-local carts for anonymous shoppers.
//!
//! Carts are keyed by the visitor's session handle and evicted after a period
//! of inactivity. Nothing here touches the network, so appends cannot fail.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use raritone_core::{Cart, CartLineItem, SessionHandle};

/// Upper bound on concurrently held anonymous carts.
const MAX_LOCAL_CARTS: u64 = 100_000;

/// In-process cart store for sessions without an identity.
#[derive(Clone)]
pub struct LocalCarts {
    carts: Cache<SessionHandle, Arc<Mutex<Cart>>>,
}

impl LocalCarts {
    /// Create a store whose carts expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_LOCAL_CARTS)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Append a line to the session's cart and return the updated cart.
    pub async fn append(&self, handle: &SessionHandle, item: CartLineItem) -> Cart {
        let cart = self
            .carts
            .get_with(handle.clone(), async { Arc::new(Mutex::new(Cart::empty())) })
            .await;

        let mut cart = cart.lock().await;
        cart.items.push(item);
        tracing::debug!(lines = cart.items.len(), "appended to local cart");
        cart.clone()
    }

    /// Current cart for the session, empty if it has none.
    pub async fn get(&self, handle: &SessionHandle) -> Cart {
        match self.carts.get(handle).await {
            Some(cart) => cart.lock().await.clone(),
            None => Cart::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use raritone_core::{CurrencyCode, Price, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            name: "Hoodie".to_string(),
            unit_price: Price::new(Decimal::new(1999, 0), CurrencyCode::INR),
            quantity: 1,
            size: None,
            color_or_image_ref: None,
        }
    }

    #[tokio::test]
    async fn test_append_keeps_duplicates_in_order() {
        let carts = LocalCarts::new(Duration::from_secs(60));
        let handle = SessionHandle::new("s1");

        carts.append(&handle, item("hoodie-1")).await;
        let cart = carts.append(&handle, item("hoodie-1")).await;

        assert_eq!(cart.items.len(), 2);
        assert_eq!(carts.get(&handle).await, cart);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_session() {
        let carts = LocalCarts::new(Duration::from_secs(60));
        carts.append(&SessionHandle::new("s1"), item("tee-1")).await;

        assert!(carts.get(&SessionHandle::new("s2")).await.items.is_empty());
    }
}
