//! Shopping cart commands.

use clap::Subcommand;
use farmstand_core::ProductId;
use farmstand_storefront::AppError;

use super::State;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a catalog product
    Add {
        /// Product ID
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a line (0 removes it)
    Set {
        /// Product ID
        id: ProductId,

        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

pub fn run(state: &State, action: CartAction) -> Result<(), AppError> {
    let cart = state.cart();
    match action {
        CartAction::Show => {}
        CartAction::Add { id, quantity } => {
            let product = super::product(state, &id)?;
            cart.add(product.clone(), quantity);
        }
        CartAction::Remove { id } => cart.remove(&id),
        CartAction::Set { id, quantity } => {
            if cart.quantity_of(&id) == 0 {
                return Err(AppError::NotFound(format!("Cart line {id}")));
            }
            cart.set_quantity(&id, quantity);
        }
        CartAction::Clear => cart.clear(),
    }

    for line in cart.items() {
        tracing::info!(
            id = %line.product.id,
            quantity = line.quantity,
            unit_price = %line.product.price,
            total = %line.line_total(),
            "{}",
            line.product.name
        );
    }
    tracing::info!(
        items = cart.total_items(),
        total = %cart.total_price(),
        "Cart"
    );
    Ok(())
}
