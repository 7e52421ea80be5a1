//! CLI command implementations.

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod orders;

use farmstand_core::{Product, ProductId};
use farmstand_storefront::AppError;
use farmstand_storefront::auth::SimulatedBiometrics;

/// App state as wired by the CLI.
pub type State = farmstand_storefront::AppState<SimulatedBiometrics>;

/// Look up a catalog product by id.
fn product<'a>(state: &'a State, id: &ProductId) -> Result<&'a Product, AppError> {
    state
        .catalog()
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))
}
