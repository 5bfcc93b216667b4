//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{
    CartService, CartServiceError, IdentityProvider, LocalCarts, ReviewBoard, ReviewPublisher,
    SimulatedReviewService, ToastQueue, UserServiceClient, VisitorPreferences, WishlistSignal,
};
use crate::workflows::ReviewWorkflow;

/// Collaborators that tests swap for fakes.
pub struct StateParts {
    pub cart_service: Arc<dyn CartService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub review_publisher: Arc<dyn ReviewPublisher>,
    pub review_board: Arc<ReviewBoard>,
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart_service: Arc<dyn CartService>,
    identity_provider: Arc<dyn IdentityProvider>,
    local_carts: LocalCarts,
    preferences: VisitorPreferences,
    reviews: ReviewWorkflow,
    wishlist_signal: WishlistSignal,
}

impl AppState {
    /// Create state backed by the user/cart service and the simulated review
    /// publisher.
    ///
    /// # Errors
    ///
    /// Returns an error if the user/cart service client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CartServiceError> {
        let client = Arc::new(UserServiceClient::new(&config.cart_service)?);
        let publisher = Arc::new(SimulatedReviewService::new(
            config.workflows.review_submit_latency,
        ));

        Ok(Self::from_parts(
            config,
            StateParts {
                cart_service: client.clone(),
                identity_provider: client,
                review_publisher: publisher,
                review_board: Arc::new(ReviewBoard::with_launch_reviews()),
            },
        ))
    }

    #[must_use]
    pub fn from_parts(config: StorefrontConfig, parts: StateParts) -> Self {
        let local_carts = LocalCarts::new(config.workflows.local_cart_idle);
        let preferences = VisitorPreferences::new(config.workflows.local_cart_idle);
        let reviews = ReviewWorkflow::new(parts.review_board, parts.review_publisher);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                cart_service: parts.cart_service,
                identity_provider: parts.identity_provider,
                local_carts,
                preferences,
                reviews,
                wishlist_signal: WishlistSignal::default(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn cart_service(&self) -> &dyn CartService {
        self.inner.cart_service.as_ref()
    }

    #[must_use]
    pub fn identity_provider(&self) -> &dyn IdentityProvider {
        self.inner.identity_provider.as_ref()
    }

    #[must_use]
    pub fn local_carts(&self) -> &LocalCarts {
        &self.inner.local_carts
    }

    #[must_use]
    pub fn preferences(&self) -> &VisitorPreferences {
        &self.inner.preferences
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewWorkflow {
        &self.inner.reviews
    }

    #[must_use]
    pub fn wishlist_signal(&self) -> &WishlistSignal {
        &self.inner.wishlist_signal
    }

    /// Fresh toast queue for one request.
    #[must_use]
    pub fn toast_queue(&self) -> ToastQueue {
        ToastQueue::from_config(&self.inner.config.workflows)
    }
}
