//! RARITONE Core - Shared domain types library.
//!
//! This crate provides the types shared by the storefront workflows:
//! - `storefront` - Cart, wishlist and review workflows behind a JSON API
//! - `integration-tests` - In-process HTTP tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no session
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, cart lines, wishlists, reviews, toasts and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
