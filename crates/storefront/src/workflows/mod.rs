//! Storefront workflows.
//!
//! Each workflow validates its input, calls the collaborators it needs, and
//! reports the outcome to the shopper through exactly one toast when it fails.
//! Route handlers wire request state into these types; nothing here knows
//! about HTTP.

pub mod add_to_cart;
pub mod reviews;
pub mod wishlist;

pub use add_to_cart::{AddToCartConfirmation, AddToCartWorkflow, CartError, CartTarget, FollowUp};
pub use reviews::{ReviewComposer, ReviewError, ReviewWorkflow, synthesize_review, validate_draft};
pub use wishlist::{WishlistChangeResult, WishlistError, WishlistView, toggle_wishlist};
