//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartItem, OrderId, OrderStatus, Price, Product};

/// A frozen order line.
///
/// `price` is the unit price at purchase time. It is stored separately from
/// `product.price` so historical orders keep their value if the product is
/// re-listed at another price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Product,
    pub quantity: u32,
    pub price: Price,
}

impl OrderItem {
    /// Purchase price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartItem> for OrderItem {
    fn from(line: &CartItem) -> Self {
        Self {
            product: line.product.clone(),
            quantity: line.quantity,
            price: line.product.price,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_item_captures_current_price() {
        let mut product = Product::new("7", "Kale", Price::from_cents(300), "Vegetables");
        let line = CartItem {
            product: product.clone(),
            quantity: 2,
        };
        let item = OrderItem::from(&line);

        product.price = Price::from_cents(999);
        assert_eq!(item.price, Price::from_cents(300));
        assert_eq!(item.line_total(), Price::from_cents(600));
    }

    #[test]
    fn test_order_json_shape() {
        let order = Order {
            id: OrderId::new("order_1_x"),
            items: Vec::new(),
            total_amount: Price::from_cents(1000),
            order_date: DateTime::from_timestamp(0, 0).unwrap(),
            status: OrderStatus::Confirmed,
            delivery_address: None,
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "confirmed");
        assert_eq!(value["orderDate"], "1970-01-01T00:00:00Z");
        assert!(value.get("totalAmount").is_some());
        assert!(value.get("deliveryAddress").is_none());
    }
}
