//! Shopping cart.
//!
//! The cart is an ordered list of lines with at most one line per product.
//! Totals are derived on every read, so they can never drift from the lines.

use tokio::sync::watch;
use tracing::instrument;

use farmstand_core::{CartItem, Price, Product, ProductId};

use super::Persisted;
use crate::storage::{Storage, keys};

/// Cart lines persisted under `cart`.
#[derive(Debug)]
pub struct CartStore {
    inner: Persisted<Vec<CartItem>>,
}

impl CartStore {
    /// Load the cart from local storage.
    ///
    /// Lines with a zero quantity or a duplicated product id in the stored
    /// blob are folded so the one-line-per-product rule holds from the start,
    /// and the folded cart is written back.
    pub async fn load(storage: Storage) -> Self {
        let inner: Persisted<Vec<CartItem>> = Persisted::load(storage, keys::CART).await;
        inner.modify(|items: &mut Vec<CartItem>| {
            let before = items.len();
            *items = normalize(std::mem::take(items));
            items.len() != before
        });
        Self { inner }
    }

    /// Watch the cart lines.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.inner.subscribe()
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.read(Clone::clone)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read(Vec::is_empty)
    }

    /// Quantity of `product_id` in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.inner.read(|items| {
            items
                .iter()
                .find(|item| &item.product.id == product_id)
                .map_or(0, |item| item.quantity)
        })
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: Product, quantity: u32) {
        if quantity == 0 {
            tracing::debug!("Ignoring add of zero units");
            return;
        }
        self.inner.modify(|items| {
            if let Some(line) = items.iter_mut().find(|item| item.product.id == product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                items.push(CartItem { product, quantity });
            }
            true
        });
    }

    /// Drop the line for `product_id`.
    #[instrument(skip(self))]
    pub fn remove(&self, product_id: &ProductId) {
        self.inner.modify(|items| {
            let before = items.len();
            items.retain(|item| &item.product.id != product_id);
            items.len() != before
        });
    }

    /// Replace the quantity of a line. A quantity of 0 removes the line.
    /// Unknown products are ignored.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        self.inner.modify(|items| {
            items
                .iter_mut()
                .find(|item| &item.product.id == product_id)
                .is_some_and(|line| {
                    let changed = line.quantity != quantity;
                    line.quantity = quantity;
                    changed
                })
        });
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        drop(self.take());
    }

    /// Empty the cart and hand back the lines it held, in one step.
    pub fn take(&self) -> Vec<CartItem> {
        let lines = self.inner.state.send_replace(Vec::new());
        self.inner
            .storage
            .save_in_background(self.inner.key, &Vec::<CartItem>::new());
        lines
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.inner
            .read(|items| items.iter().map(|item| item.quantity).sum())
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.inner
            .read(|items| items.iter().map(CartItem::line_total).sum())
    }
}

fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items.into_iter().filter(|item| item.quantity > 0) {
        match merged
            .iter_mut()
            .find(|line| line.product.id == item.product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: &str, cents: u32) -> Product {
        Product::new(id, format!("Product {id}"), Price::from_cents(cents), "Produce")
    }

    async fn empty_cart() -> (CartStore, Storage, MemoryStore) {
        let backend = MemoryStore::new();
        let storage = Storage::spawn("local", backend.clone());
        (CartStore::load(storage.clone()).await, storage, backend)
    }

    #[tokio::test]
    async fn test_add_same_product_twice_merges() {
        let (cart, _, _) = empty_cart().await;
        cart.add(product("1", 100), 1);
        cart.add(product("1", 100), 2);

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_keeps_insertion_order() {
        let (cart, _, _) = empty_cart().await;
        cart.add(product("b", 100), 1);
        cart.add(product("a", 100), 1);
        cart.add(product("b", 100), 1);

        let ids: Vec<String> = cart
            .items()
            .into_iter()
            .map(|item| item.product.id.into_inner())
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_add_zero_is_noop() {
        let (cart, _, _) = empty_cart().await;
        cart.add(product("1", 100), 0);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let (cart, _, _) = empty_cart().await;
        cart.add(product("1", 100), 2);
        cart.add(product("2", 100), 1);

        cart.set_quantity(&ProductId::new("1"), 0);
        assert_eq!(cart.quantity_of(&ProductId::new("1")), 0);
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_set_quantity_replaces_and_ignores_unknown() {
        let (cart, _, _) = empty_cart().await;
        cart.add(product("1", 100), 2);

        cart.set_quantity(&ProductId::new("1"), 7);
        cart.set_quantity(&ProductId::new("missing"), 4);

        assert_eq!(cart.quantity_of(&ProductId::new("1")), 7);
        assert_eq!(cart.items().len(), 1);
    }

    #[tokio::test]
    async fn test_totals_track_every_mutation() {
        let (cart, _, _) = empty_cart().await;
        let check = |cart: &CartStore| {
            let expected: Price = cart
                .items()
                .iter()
                .map(|item| item.product.price.times(item.quantity))
                .sum();
            assert_eq!(cart.total_price(), expected);
        };

        cart.add(product("1", 499), 2);
        check(&cart);
        cart.add(product("2", 125), 3);
        check(&cart);
        cart.set_quantity(&ProductId::new("1"), 1);
        check(&cart);
        cart.remove(&ProductId::new("2"));
        check(&cart);

        assert_eq!(cart.total_price(), Price::from_cents(499));
        assert_eq!(cart.total_items(), 1);

        cart.clear();
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[tokio::test]
    async fn test_mutations_are_written_through() {
        let (cart, storage, backend) = empty_cart().await;
        cart.add(product("1", 250), 2);
        storage.flush().await;

        let stored: Vec<CartItem> = serde_json::from_str(&backend.peek("cart").unwrap()).unwrap();
        assert_eq!(stored, cart.items());

        cart.clear();
        storage.flush().await;
        assert_eq!(backend.peek("cart").as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_load_folds_duplicate_lines() {
        let backend = MemoryStore::new();
        let lines = vec![
            CartItem {
                product: product("1", 100),
                quantity: 1,
            },
            CartItem {
                product: product("1", 100),
                quantity: 2,
            },
            CartItem {
                product: product("2", 100),
                quantity: 0,
            },
        ];
        backend.insert("cart", serde_json::to_string(&lines).unwrap());

        let storage = Storage::spawn("local", backend.clone());
        let cart = CartStore::load(storage.clone()).await;
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 3);

        storage.flush().await;
        let stored: Vec<CartItem> = serde_json::from_str(&backend.peek("cart").unwrap()).unwrap();
        assert_eq!(stored, cart.items());
    }

    #[tokio::test]
    async fn test_take_returns_lines_and_empties() {
        let (cart, storage, backend) = empty_cart().await;
        cart.add(product("1", 250), 2);
        cart.add(product("2", 100), 1);

        let lines = cart.take();
        assert_eq!(lines.len(), 2);
        assert!(cart.is_empty());
        assert!(cart.take().is_empty());

        storage.flush().await;
        assert_eq!(backend.peek("cart").as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (cart, _, _) = empty_cart().await;
        let mut rx = cart.subscribe();

        cart.add(product("1", 100), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        cart.set_quantity(&ProductId::new("1"), 1);
        assert!(!rx.has_changed().unwrap());
    }
}
