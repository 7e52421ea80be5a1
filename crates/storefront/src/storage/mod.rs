//! Device-local key-value persistence.
//!
//! # Keys
//!
//! ## Local storage
//! - `user` - The signed-in [`User`](farmstand_core::User)
//! - `cart` - Cart lines
//! - `favorites` - Favorite product ids (JSON array)
//! - `orders` - Placed orders, most recent first
//! - `addresses` - Saved delivery addresses
//!
//! ## Secure storage
//! - `user_pin` - Argon2 hash of the unlock PIN
//! - `pin_enabled` - `"true"` once a PIN is set up
//! - `biometric_enabled` - `"true"` or `"false"`
//! - `biometric_type` - `fingerprint` or `facial`
//!
//! # Backends
//!
//! A backend implements [`KeyValueStore`]. [`Storage`] wraps a backend in a
//! single worker task so every write lands in the order it was issued.

mod file;
mod memory;
mod worker;

use std::future::Future;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use worker::Storage;

/// Local storage keys.
pub mod keys {
    pub const USER: &str = "user";
    pub const CART: &str = "cart";
    pub const FAVORITES: &str = "favorites";
    pub const ORDERS: &str = "orders";
    pub const ADDRESSES: &str = "addresses";
}

/// Secure storage keys.
pub mod secure_keys {
    pub const USER_PIN: &str = "user_pin";
    pub const PIN_ENABLED: &str = "pin_enabled";
    pub const BIOMETRIC_ENABLED: &str = "biometric_enabled";
    pub const BIOMETRIC_TYPE: &str = "biometric_type";
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blob could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The storage worker has shut down.
    #[error("storage worker is closed")]
    Closed,
}

/// A string-to-string store, the shape of a mobile device's async storage.
///
/// Implementations must be thread-safe (`Send + Sync`); all values are JSON
/// text or plain flags.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a value. Returns `Ok(None)` for a missing key.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a value, replacing any existing one.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Keys are restricted to a safe subset so every backend can store them as-is.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
