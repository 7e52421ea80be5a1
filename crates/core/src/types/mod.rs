//! Core types for Farmstand.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! serializable shapes persisted by the storefront stores.

pub mod address;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod product;
pub mod status;
pub mod user;

pub use address::{Address, AddressDraft};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Price;
pub use order::{Order, OrderItem};
pub use product::{CartItem, Product};
pub use status::*;
pub use user::User;
