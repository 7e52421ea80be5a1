//! Application state shared across front ends.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use farmstand_core::{CartItem, Order, Price};

use crate::auth::{AuthError, AuthSettings, AuthStore, Biometrics, Verification};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::{AppError, add_breadcrumb};
use crate::storage::{FileStore, KeyValueStore, Storage};
use crate::stores::{AddressBook, CartStore, FavoritesStore, OrderStore};

/// Errors from [`AppState::checkout`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Neither the biometric prompt nor the PIN confirmed the payment.
    #[error(transparent)]
    Verification(#[from] AuthError),
}

/// Every store of one device, plus the catalog.
///
/// This struct is cheaply cloneable via `Arc`.
pub struct AppState<B> {
    inner: Arc<AppStateInner<B>>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> std::fmt::Debug for AppState<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("products", &self.inner.catalog.len())
            .field("cart", &self.inner.cart)
            .field("auth", &self.inner.auth)
            .finish_non_exhaustive()
    }
}

struct AppStateInner<B> {
    catalog: Catalog,
    cart: CartStore,
    orders: OrderStore,
    favorites: FavoritesStore,
    addresses: AddressBook,
    auth: AuthStore<B>,
    local: Storage,
    secure: Storage,
}

impl<B: Biometrics> AppState<B> {
    /// Open file-backed storage under the configured data directory and load
    /// every store.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage directory cannot be created or the
    /// catalog cannot be loaded.
    pub async fn open(config: &AppConfig, biometrics: B) -> Result<Self, AppError> {
        let local = FileStore::open(config.local_dir()).await?;
        let secure = FileStore::open(config.secure_dir()).await?;
        let catalog = Catalog::load(&config.catalog_path).await?;
        Ok(Self::with_backends(local, secure, catalog, biometrics, config.auth.clone()).await)
    }

    /// Load every store from the given backends.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn with_backends(
        local: impl KeyValueStore,
        secure: impl KeyValueStore,
        catalog: Catalog,
        biometrics: B,
        settings: AuthSettings,
    ) -> Self {
        let local = Storage::spawn("local", local);
        let secure = Storage::spawn("secure", secure);

        let (cart, orders, favorites, addresses, auth) = tokio::join!(
            CartStore::load(local.clone()),
            OrderStore::load(local.clone()),
            FavoritesStore::load(local.clone()),
            AddressBook::load(local.clone()),
            AuthStore::load(local.clone(), secure.clone(), biometrics, settings),
        );

        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                cart,
                orders,
                favorites,
                addresses,
                auth,
                local,
                secure,
            }),
        }
    }

    /// Pay for the cart.
    ///
    /// Verifies with the chosen method, then takes every line in the cart at
    /// that moment, including lines added while the prompt was open, and
    /// turns them into an order delivered to the default address.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to order, or
    /// `CheckoutError::Verification` if verification fails. The cart is left
    /// untouched on error.
    #[instrument(skip(self, verification))]
    pub async fn checkout(&self, verification: &Verification) -> Result<Order, CheckoutError> {
        if self.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let method = match verification {
            Verification::Biometric => "biometric",
            Verification::Pin(_) => "pin",
        };
        add_breadcrumb("checkout", "Payment verification", &[("method", method)]);
        self.auth().verify(verification).await?;

        // A checkout that finished first may already have taken the lines
        let lines = self.cart().take();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total: Price = lines.iter().map(CartItem::line_total).sum();
        let delivery_address = self.addresses().default_address().map(|a| a.one_line());
        Ok(self.orders().create_order(&lines, total, delivery_address))
    }
}

impl<B> AppState<B> {
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore {
        &self.inner.favorites
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.inner.addresses
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore<B> {
        &self.inner.auth
    }

    /// Wait until every write issued so far has reached both backends.
    pub async fn flush(&self) {
        tokio::join!(self.inner.local.flush(), self.inner.secure.flush());
    }
}
