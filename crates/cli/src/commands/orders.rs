//! Order history commands.

use clap::Subcommand;
use farmstand_core::{Order, OrderId, OrderStatus};
use farmstand_storefront::AppError;

use super::State;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List orders, newest first
    List,
    /// Show one order with its lines
    Show {
        /// Order ID
        id: OrderId,
    },
    /// Change the status of an order
    Status {
        /// Order ID
        id: OrderId,

        /// pending, confirmed, processing, shipped, delivered or cancelled
        status: String,
    },
    /// Delete the whole history
    Clear,
}

pub fn run(state: &State, action: OrdersAction) -> Result<(), AppError> {
    let orders = state.orders();
    match action {
        OrdersAction::List => {
            let all = orders.orders();
            for order in &all {
                log_order(order);
            }
            tracing::info!(count = all.len(), "Orders");
        }
        OrdersAction::Show { id } => {
            let order = orders
                .get(&id)
                .ok_or_else(|| AppError::NotFound(format!("Order {id}")))?;
            log_order(&order);
            for item in &order.items {
                tracing::info!(
                    quantity = item.quantity,
                    unit_price = %item.price,
                    total = %item.line_total(),
                    "{}",
                    item.product.name
                );
            }
            if let Some(address) = &order.delivery_address {
                tracing::info!("Deliver to {address}");
            }
        }
        OrdersAction::Status { id, status } => {
            let status: OrderStatus = status.parse().map_err(AppError::BadRequest)?;
            if !orders.update_status(&id, status) {
                return Err(AppError::NotFound(format!("Order {id}")));
            }
        }
        OrdersAction::Clear => orders.clear_history(),
    }
    Ok(())
}

fn log_order(order: &Order) {
    tracing::info!(
        id = %order.id,
        date = %order.order_date.format("%Y-%m-%d %H:%M"),
        status = %order.status,
        items = order.item_count(),
        total = %order.total_amount,
        "Order"
    );
}
