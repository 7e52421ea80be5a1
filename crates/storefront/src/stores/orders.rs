//! Order history.

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::watch;
use tracing::instrument;

use farmstand_core::{CartItem, Order, OrderId, OrderItem, OrderStatus, Price};

use super::Persisted;
use crate::storage::{Storage, keys};

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Placed orders, most recent first, persisted under `orders`.
#[derive(Debug)]
pub struct OrderStore {
    inner: Persisted<Vec<Order>>,
}

impl OrderStore {
    /// Load the order history from local storage.
    pub async fn load(storage: Storage) -> Self {
        Self {
            inner: Persisted::load(storage, keys::ORDERS).await,
        }
    }

    /// Watch the order list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.inner.subscribe()
    }

    /// Snapshot of all orders, most recent first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.inner.read(Clone::clone)
    }

    /// Look up an order by id.
    #[must_use]
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.inner
            .read(|orders| orders.iter().find(|order| &order.id == order_id).cloned())
    }

    /// Freeze `lines` into a new confirmed order and put it at the front of
    /// the history.
    ///
    /// Each line records the product price as it is right now.
    #[instrument(skip(self, lines), fields(lines = lines.len(), %total))]
    pub fn create_order(
        &self,
        lines: &[CartItem],
        total: Price,
        delivery_address: Option<String>,
    ) -> Order {
        let now = Utc::now();
        let order = Order {
            id: generate_order_id(now, &mut rand::rng()),
            items: lines.iter().map(OrderItem::from).collect(),
            total_amount: total,
            order_date: now,
            status: OrderStatus::Confirmed,
            delivery_address,
        };

        self.inner.modify(|orders| {
            orders.insert(0, order.clone());
            true
        });
        tracing::info!(order_id = %order.id, "Order created");
        order
    }

    /// Set the status of an order. Returns `false` if no order matched.
    #[instrument(skip(self))]
    pub fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> bool {
        let mut found = false;
        self.inner.modify(|orders| {
            let Some(order) = orders.iter_mut().find(|order| &order.id == order_id) else {
                return false;
            };
            found = true;
            let changed = order.status != status;
            order.status = status;
            changed
        });
        found
    }

    /// Drop the whole history and its stored blob.
    #[instrument(skip(self))]
    pub fn clear_history(&self) {
        self.inner.reset();
    }
}

/// `order_<unix-millis>_<9 base-36 chars>`.
fn generate_order_id(now: DateTime<Utc>, rng: &mut impl Rng) -> OrderId {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            char::from(ID_ALPHABET.get(idx).copied().unwrap_or(b'0'))
        })
        .collect();
    OrderId::new(format!("order_{}_{suffix}", now.timestamp_millis()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmstand_core::Product;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::storage::MemoryStore;

    fn line(id: &str, cents: u32, quantity: u32) -> CartItem {
        CartItem {
            product: Product::new(id, id, Price::from_cents(cents), "Produce"),
            quantity,
        }
    }

    async fn store() -> (OrderStore, Storage, MemoryStore) {
        let backend = MemoryStore::new();
        let storage = Storage::spawn("local", backend.clone());
        (OrderStore::load(storage.clone()).await, storage, backend)
    }

    #[test]
    fn test_order_id_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let id = generate_order_id(now, &mut StdRng::seed_from_u64(7));

        let (prefix, suffix) = id.as_str().rsplit_once('_').unwrap();
        assert_eq!(prefix, "order_1700000000123");
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn test_create_order_prepends_confirmed() {
        let (orders, _, _) = store().await;
        let first = orders.create_order(&[line("1", 100, 1)], Price::from_cents(100), None);
        let second = orders.create_order(
            &[line("2", 200, 2)],
            Price::from_cents(400),
            Some("1 Main St".to_owned()),
        );

        let all = orders.orders();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
        assert_eq!(second.status, OrderStatus::Confirmed);
        assert_eq!(second.delivery_address.as_deref(), Some("1 Main St"));
        assert_eq!(second.item_count(), 2);
    }

    #[tokio::test]
    async fn test_order_keeps_price_at_purchase() {
        let (orders, _, _) = store().await;
        let mut lines = vec![line("1", 300, 2)];
        let order = orders.create_order(&lines, Price::from_cents(600), None);

        // Catalog re-prices the product after checkout.
        lines[0].product.price = Price::from_cents(1000);

        let stored = orders.get(&order.id).unwrap();
        assert_eq!(stored.items[0].price, Price::from_cents(300));
        assert_eq!(stored.items[0].product.price, Price::from_cents(300));
        assert_eq!(stored.total_amount, Price::from_cents(600));
    }

    #[tokio::test]
    async fn test_update_status() {
        let (orders, _, _) = store().await;
        let order = orders.create_order(&[line("1", 100, 1)], Price::from_cents(100), None);

        assert!(orders.update_status(&order.id, OrderStatus::Shipped));
        assert_eq!(orders.get(&order.id).unwrap().status, OrderStatus::Shipped);
        assert!(!orders.update_status(&OrderId::new("nope"), OrderStatus::Delivered));
    }

    #[tokio::test]
    async fn test_history_persists_and_clears() {
        let (orders, storage, backend) = store().await;
        let order = orders.create_order(&[line("1", 100, 1)], Price::from_cents(100), None);
        storage.flush().await;

        let reloaded = OrderStore::load(storage.clone()).await;
        assert_eq!(reloaded.get(&order.id), Some(order));

        orders.clear_history();
        storage.flush().await;
        assert!(orders.orders().is_empty());
        assert_eq!(backend.peek("orders"), None);
    }
}
