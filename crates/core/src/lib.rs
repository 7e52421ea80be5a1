//! Farmstand Core - Shared domain types library.
//!
//! This crate provides the types shared by all Farmstand components:
//! - `storefront` - Client-side stores (cart, orders, favorites, auth) over local storage
//! - `cli` - Command-line front end driving the stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails, statuses, and the product/order/user model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
