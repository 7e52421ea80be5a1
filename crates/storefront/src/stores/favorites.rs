//! Favorite products.

use std::collections::BTreeSet;

use tokio::sync::watch;
use tracing::instrument;

use farmstand_core::ProductId;

use super::Persisted;
use crate::storage::{Storage, keys};

/// Set of favorite product ids, persisted under `favorites` as a JSON array.
#[derive(Debug)]
pub struct FavoritesStore {
    inner: Persisted<BTreeSet<ProductId>>,
}

impl FavoritesStore {
    /// Load favorites from local storage.
    pub async fn load(storage: Storage) -> Self {
        Self {
            inner: Persisted::load(storage, keys::FAVORITES).await,
        }
    }

    /// Watch the favorite set.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<ProductId>> {
        self.inner.subscribe()
    }

    /// Snapshot of all favorite ids.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.inner.read(|ids| ids.iter().cloned().collect())
    }

    #[must_use]
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.inner.read(|ids| ids.contains(product_id))
    }

    #[instrument(skip(self))]
    pub fn add(&self, product_id: ProductId) {
        self.inner.modify(|ids| ids.insert(product_id));
    }

    #[instrument(skip(self))]
    pub fn remove(&self, product_id: &ProductId) {
        self.inner.modify(|ids| ids.remove(product_id));
    }

    /// Flip membership of `product_id`. Returns whether it is now a favorite.
    #[instrument(skip(self))]
    pub fn toggle(&self, product_id: ProductId) -> bool {
        let mut now_favorite = false;
        self.inner.modify(|ids| {
            if !ids.remove(&product_id) {
                ids.insert(product_id);
                now_favorite = true;
            }
            true
        });
        now_favorite
    }

    /// Remove every favorite.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.inner.modify(|ids| {
            ids.clear();
            true
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    async fn store() -> (FavoritesStore, Storage, MemoryStore) {
        let backend = MemoryStore::new();
        let storage = Storage::spawn("local", backend.clone());
        (FavoritesStore::load(storage.clone()).await, storage, backend)
    }

    #[tokio::test]
    async fn test_toggle_on_off_on() {
        let (favorites, _, _) = store().await;
        let id = ProductId::new("3");

        assert!(favorites.toggle(id.clone()));
        assert!(!favorites.toggle(id.clone()));
        assert!(favorites.toggle(id.clone()));

        assert!(favorites.is_favorite(&id));
        assert_eq!(favorites.ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (favorites, _, _) = store().await;
        favorites.add(ProductId::new("1"));
        favorites.add(ProductId::new("1"));
        assert_eq!(favorites.ids().len(), 1);

        favorites.remove(&ProductId::new("1"));
        favorites.remove(&ProductId::new("1"));
        assert!(favorites.ids().is_empty());
    }

    #[tokio::test]
    async fn test_persists_as_json_array() {
        let (favorites, storage, backend) = store().await;
        favorites.add(ProductId::new("2"));
        favorites.add(ProductId::new("1"));
        storage.flush().await;
        assert_eq!(backend.peek("favorites").as_deref(), Some(r#"["1","2"]"#));

        favorites.clear();
        storage.flush().await;
        assert_eq!(backend.peek("favorites").as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_loads_stored_array() {
        let backend = MemoryStore::new();
        backend.insert("favorites", r#"["9","4"]"#);
        let favorites = FavoritesStore::load(Storage::spawn("local", backend)).await;

        assert!(favorites.is_favorite(&ProductId::new("9")));
        assert!(favorites.is_favorite(&ProductId::new("4")));
    }
}
