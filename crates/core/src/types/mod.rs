//! Core types for the RARITONE storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod identity;
pub mod price;
pub mod review;
pub mod status;
pub mod toast;
pub mod wishlist;

pub use cart::{Cart, CartLineItem, CartLineItemError};
pub use id::*;
pub use identity::{ANONYMOUS_USER_NAME, Identity};
pub use price::{CurrencyCode, Price};
pub use review::{Rating, RatingError, Review, ReviewDraft, ReviewSummary};
pub use status::*;
pub use toast::{ToastKind, ToastNotification};
pub use wishlist::Wishlist;
