//! Catalog browsing commands.

use clap::Subcommand;
use farmstand_core::{Product, ProductId};
use farmstand_storefront::AppError;
use farmstand_storefront::catalog::ALL_CATEGORIES;

use super::State;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, optionally filtered
    List {
        /// Match against name or description
        #[arg(short, long, default_value = "")]
        query: String,

        /// Category name, or `All`
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
    },
    /// List categories
    Categories,
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
}

pub fn run(state: &State, action: CatalogAction) -> Result<(), AppError> {
    match action {
        CatalogAction::List { query, category } => {
            let products = state.catalog().filter(&query, &category);
            for product in &products {
                log_product(state, product);
            }
            tracing::info!(count = products.len(), "Products");
        }
        CatalogAction::Categories => {
            for category in state.catalog().categories() {
                tracing::info!("{category}");
            }
        }
        CatalogAction::Show { id } => {
            let product = super::product(state, &id)?;
            log_product(state, product);
            tracing::info!(
                farm = product.farm_name.as_deref().unwrap_or("-"),
                origin = product.origin.as_deref().unwrap_or("-"),
                rating = product.rating,
                reviews = product.reviews,
                local = product.is_local,
                organic = product.is_organic,
                "{}",
                product.description
            );
        }
    }
    Ok(())
}

fn log_product(state: &State, product: &Product) {
    tracing::info!(
        id = %product.id,
        price = %product.price,
        category = %product.category,
        favorite = state.favorites().is_favorite(&product.id),
        "{}",
        product.name
    );
}
