//! Client-side state containers.
//!
//! Each store keeps its state in a [`tokio::sync::watch`] channel so any
//! number of views can subscribe, and mirrors every change to local storage
//! in the background. Reads always see the in-memory copy.

pub mod addresses;
pub mod cart;
pub mod favorites;
pub mod orders;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::storage::Storage;

pub use addresses::{AddressBook, AddressError};
pub use cart::CartStore;
pub use favorites::FavoritesStore;
pub use orders::OrderStore;

/// State of type `T` mirrored to one storage key.
#[derive(Debug)]
struct Persisted<T> {
    key: &'static str,
    state: watch::Sender<T>,
    storage: Storage,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Load the stored blob, falling back to `T::default()` when it is
    /// missing or unreadable.
    async fn load(storage: Storage, key: &'static str) -> Self {
        let initial = match storage.get_json::<T>(key).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to load stored state, starting empty");
                T::default()
            }
        };
        let (state, _) = watch::channel(initial);
        Self {
            key,
            state,
            storage,
        }
    }

    fn subscribe(&self) -> watch::Receiver<T> {
        self.state.subscribe()
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Apply `f`; if it reports a change, notify subscribers and persist.
    fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = self.state.send_if_modified(f);
        if changed {
            self.storage
                .save_in_background(self.key, &*self.state.borrow());
        }
        changed
    }

    /// Reset to the default value and delete the stored blob.
    fn reset(&self) {
        self.state.send_replace(T::default());
        self.storage.remove_in_background(self.key);
    }
}
