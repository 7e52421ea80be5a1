//! Favorite product commands.

use clap::Subcommand;
use farmstand_core::ProductId;
use farmstand_storefront::AppError;

use super::State;

#[derive(Subcommand)]
pub enum FavoritesAction {
    /// List favorite products
    List,
    /// Flip a product in or out of favorites
    Toggle {
        /// Product ID
        id: ProductId,
    },
    /// Mark a product as favorite
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Unmark a product
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Forget every favorite
    Clear,
}

pub fn run(state: &State, action: FavoritesAction) -> Result<(), AppError> {
    let favorites = state.favorites();
    match action {
        FavoritesAction::List => {
            let ids = favorites.ids();
            for product in state.catalog().select(&ids) {
                tracing::info!(id = %product.id, price = %product.price, "{}", product.name);
            }
            tracing::info!(count = ids.len(), "Favorites");
        }
        FavoritesAction::Toggle { id } => {
            super::product(state, &id)?;
            let now_favorite = favorites.toggle(id.clone());
            tracing::info!(%id, favorite = now_favorite, "Favorite toggled");
        }
        FavoritesAction::Add { id } => {
            super::product(state, &id)?;
            favorites.add(id);
        }
        FavoritesAction::Remove { id } => favorites.remove(&id),
        FavoritesAction::Clear => favorites.clear(),
    }
    Ok(())
}
