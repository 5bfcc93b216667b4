//! Collaborators the storefront workflows call into.
//!
//! # Services
//!
//! - `cart_service` - User/cart service client (remote carts, identity lookup)
//! - `local_cart` - Session-local carts for anonymous shoppers
//! - `notifications` - Toast notification channel
//! - `preferences` - Per-visitor preference slots (wishlist, review draft)
//! - `review_board` - In-memory review list
//! - `review_publisher` - Review acceptance backend
//! - `signal` - Wishlist-changed publish/subscribe

pub mod cart_service;
pub mod local_cart;
pub mod notifications;
pub mod preferences;
pub mod review_board;
pub mod review_publisher;
pub mod signal;

pub use cart_service::{CartService, CartServiceError, IdentityProvider, UserServiceClient};
pub use local_cart::LocalCarts;
pub use notifications::{NotificationChannel, ToastQueue};
pub use preferences::{
    MemoryPreferenceStore, PreferenceStore, REVIEW_DRAFT_SLOT, StorageError, VisitorPreferences,
    VisitorSlots, WISHLIST_SLOT,
};
pub use review_board::ReviewBoard;
pub use review_publisher::{ReviewPublisher, ReviewServiceError, SimulatedReviewService};
pub use signal::{WishlistChanged, WishlistSignal, WishlistSubscription};
