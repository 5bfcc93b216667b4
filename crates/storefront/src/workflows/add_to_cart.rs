//! Add-to-cart workflow.
//!
//! Signed-in shoppers write to the user/cart service. Anonymous shoppers get
//! a cart that lives with their session.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use raritone_core::{Cart, CartLineItem, CartLineItemError, Identity, SessionHandle, ToastNotification};

use crate::services::{CartService, CartServiceError, LocalCarts, NotificationChannel};

/// Where an add-to-cart call writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartTarget {
    /// The signed-in user's server-side cart.
    Remote(Identity),
    /// The anonymous visitor's session cart.
    Local(SessionHandle),
}

impl CartTarget {
    /// Pick the target for a call. An identity always wins over the session.
    #[must_use]
    pub fn resolve(identity: Option<Identity>, handle: SessionHandle) -> Self {
        match identity {
            Some(identity) => Self::Remote(identity),
            None => Self::Local(handle),
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("invalid cart item: {0}")]
    InvalidItem(#[from] CartLineItemError),

    #[error("cart service error: {0}")]
    Service(#[from] CartServiceError),
}

impl CartError {
    /// Toast shown to the shopper for this failure.
    #[must_use]
    pub fn toast(&self) -> ToastNotification {
        match self {
            Self::InvalidItem(_) => ToastNotification::warning(
                "Invalid Selection",
                "Please choose a valid product and quantity.",
            ),
            Self::Service(_) => {
                ToastNotification::error("Error", "Failed to add item to cart. Please try again.")
            }
        }
    }
}

/// Actions offered next to the add-to-cart confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    ViewCart,
    Checkout,
}

impl FollowUp {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::ViewCart => "/cart",
            Self::Checkout => "/checkout",
        }
    }
}

/// Confirmation shown once the item has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCartConfirmation {
    pub item: CartLineItem,
    pub cart: Cart,
    pub follow_ups: [FollowUp; 2],
}

impl AddToCartConfirmation {
    fn new(item: CartLineItem, cart: Cart) -> Self {
        Self {
            item,
            cart,
            follow_ups: [FollowUp::ViewCart, FollowUp::Checkout],
        }
    }
}

pub struct AddToCartWorkflow<'a> {
    cart_service: &'a dyn CartService,
    local_carts: &'a LocalCarts,
    notifications: &'a dyn NotificationChannel,
}

impl<'a> AddToCartWorkflow<'a> {
    #[must_use]
    pub const fn new(
        cart_service: &'a dyn CartService,
        local_carts: &'a LocalCarts,
        notifications: &'a dyn NotificationChannel,
    ) -> Self {
        Self {
            cart_service,
            local_carts,
            notifications,
        }
    }

    /// Store `item` in the target's cart and build the confirmation.
    ///
    /// The confirmation only exists after the cart write has completed. Remote
    /// failures are not retried.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidItem` for a blank product id or zero
    /// quantity, and `CartError::Service` if the user/cart service fails.
    /// Either way one toast has been shown.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, remote = target.is_remote()))]
    pub async fn add_to_cart(
        &self,
        target: &CartTarget,
        item: CartLineItem,
    ) -> Result<AddToCartConfirmation, CartError> {
        let result = self.store(target, item).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "add to cart failed");
            self.notifications.show_toast(err.toast());
        }
        result
    }

    async fn store(
        &self,
        target: &CartTarget,
        item: CartLineItem,
    ) -> Result<AddToCartConfirmation, CartError> {
        item.validate()?;

        let cart = match target {
            CartTarget::Remote(identity) => {
                self.cart_service.add_to_cart(&identity.id, &item).await?;
                self.cart_service.refresh_cart(&identity.id).await?
            }
            CartTarget::Local(handle) => self.local_carts.append(handle, item.clone()).await,
        };

        tracing::info!(lines = cart.items.len(), "item added to cart");
        Ok(AddToCartConfirmation::new(item, cart))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use raritone_core::{CurrencyCode, Price, ProductId, ToastKind, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::ToastQueue;

    #[derive(Default)]
    struct FakeCartService {
        fail: bool,
        calls: AtomicUsize,
        items: Mutex<Vec<CartLineItem>>,
    }

    impl FakeCartService {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CartService for FakeCartService {
        async fn add_to_cart(
            &self,
            _user_id: &UserId,
            item: &CartLineItem,
        ) -> Result<(), CartServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CartServiceError::Unavailable("connection refused".to_string()));
            }
            self.items.lock().unwrap().push(item.clone());
            Ok(())
        }

        async fn refresh_cart(&self, _user_id: &UserId) -> Result<Cart, CartServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Cart {
                items: self.items.lock().unwrap().clone(),
            })
        }
    }

    fn item(product: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(product),
            name: "AI Fit Tee".to_string(),
            unit_price: Price::new(Decimal::new(129_900, 2), CurrencyCode::INR),
            quantity,
            size: Some("M".to_string()),
            color_or_image_ref: Some("black".to_string()),
        }
    }

    fn remote() -> CartTarget {
        CartTarget::Remote(Identity::new("u1", Some("Asha".to_string())))
    }

    fn local() -> CartTarget {
        CartTarget::Local(SessionHandle::new("s1"))
    }

    #[test]
    fn test_target_resolution() {
        let handle = SessionHandle::new("s1");
        assert_eq!(CartTarget::resolve(None, handle.clone()), local());
        assert!(CartTarget::resolve(Some(Identity::new("u1", None)), handle).is_remote());
    }

    #[tokio::test]
    async fn test_remote_add_returns_refreshed_cart() {
        let service = FakeCartService::default();
        let carts = LocalCarts::new(Duration::from_secs(60));
        let toasts = ToastQueue::new(5, Duration::from_secs(5));
        let workflow = AddToCartWorkflow::new(&service, &carts, &toasts);

        let confirmation = workflow.add_to_cart(&remote(), item("p1", 2)).await.unwrap();

        assert_eq!(confirmation.cart.items, vec![item("p1", 2)]);
        assert_eq!(confirmation.item, item("p1", 2));
        assert_eq!(confirmation.follow_ups.map(FollowUp::path), ["/cart", "/checkout"]);
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_shows_one_error_toast() {
        let service = FakeCartService::failing();
        let carts = LocalCarts::new(Duration::from_secs(60));
        let toasts = ToastQueue::new(5, Duration::from_secs(5));
        let workflow = AddToCartWorkflow::new(&service, &carts, &toasts);

        let result = workflow.add_to_cart(&remote(), item("p1", 1)).await;

        assert!(matches!(result, Err(CartError::Service(_))));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        let shown = toasts.take_all();
        assert_eq!(shown.len(), 1);
        let toast = shown.first().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Failed to add item to cart. Please try again.");
    }

    #[tokio::test]
    async fn test_local_add_never_calls_service() {
        let service = FakeCartService::failing();
        let carts = LocalCarts::new(Duration::from_secs(60));
        let toasts = ToastQueue::new(5, Duration::from_secs(5));
        let workflow = AddToCartWorkflow::new(&service, &carts, &toasts);

        workflow.add_to_cart(&local(), item("p1", 1)).await.unwrap();
        let confirmation = workflow.add_to_cart(&local(), item("p2", 3)).await.unwrap();

        assert_eq!(confirmation.cart.items.len(), 2);
        assert_eq!(confirmation.cart.item_count(), 4);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(toasts.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_item_never_reaches_a_cart() {
        let service = FakeCartService::default();
        let carts = LocalCarts::new(Duration::from_secs(60));
        let toasts = ToastQueue::new(5, Duration::from_secs(5));
        let workflow = AddToCartWorkflow::new(&service, &carts, &toasts);

        let zero = workflow.add_to_cart(&remote(), item("p1", 0)).await;
        let blank = workflow.add_to_cart(&local(), item("  ", 1)).await;

        assert!(matches!(
            zero,
            Err(CartError::InvalidItem(CartLineItemError::ZeroQuantity))
        ));
        assert!(matches!(
            blank,
            Err(CartError::InvalidItem(CartLineItemError::EmptyProductId))
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(carts.get(&SessionHandle::new("s1")).await.items.is_empty());

        let shown = toasts.take_all();
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|toast| toast.kind == ToastKind::Warning));
    }
}
