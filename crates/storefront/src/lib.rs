//! Farmstand storefront library.
//!
//! Client-side state for the Farmstand marketplace: the shopping cart, order
//! history, favorites, saved addresses and the signed-in user, each mirrored
//! to a local key-value store. The unlock PIN and biometric flags live in a
//! separate secure store.
//!
//! # Layout
//!
//! - [`storage`] - key-value backends and the ordered write-behind worker
//! - [`stores`] - cart, orders, favorites and address book
//! - [`auth`] - session, PIN and biometric unlock gate
//! - [`catalog`] - read-only product list
//! - [`state`] - every store of one device, plus checkout
//! - [`config`] - environment configuration
//! - [`error`] - unified error type with Sentry reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
pub mod stores;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use state::{AppState, CheckoutError};
