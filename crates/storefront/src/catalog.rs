//! Product catalog.
//!
//! Read-only reference data loaded from a JSON array of products.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use farmstand_core::{Product, ProductId};

/// Category name that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Errors loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id in catalog: {0}")]
    DuplicateId(ProductId),
}

/// Immutable list of products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let duplicate = {
            let mut seen = HashSet::with_capacity(products.len());
            products
                .iter()
                .find(|product| !seen.insert(&product.id))
                .map(|product| product.id.clone())
        };
        match duplicate {
            Some(id) => Err(CatalogError::DuplicateId(id)),
            None => Ok(Self { products }),
        }
    }

    /// Parse a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` or `CatalogError::DuplicateId`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the
    /// errors of [`Catalog::from_json`].
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_owned(),
                source,
            })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// `All` followed by each distinct category in catalog order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories = vec![ALL_CATEGORIES];
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    /// Products matching `query` (name or description, case-insensitive) in
    /// `category` (`All` for any).
    #[must_use]
    pub fn filter(&self, query: &str, category: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|product| category == ALL_CATEGORIES || product.category == category)
            .filter(|product| product.matches_query(&query))
            .collect()
    }

    /// Catalog products whose id is in `ids`, in catalog order. Ids with no
    /// product are skipped.
    #[must_use]
    pub fn select(&self, ids: &[ProductId]) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| ids.contains(&product.id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmstand_core::Price;

    use super::*;

    fn catalog() -> Catalog {
        let mut tomatoes = Product::new("1", "Heirloom Tomatoes", Price::from_cents(499), "Vegetables");
        tomatoes.description = "Sweet and juicy".to_owned();
        let honey = Product::new("2", "Raw Honey", Price::from_cents(1200), "Pantry");
        let mut kale = Product::new("3", "Kale", Price::from_cents(300), "Vegetables");
        kale.description = "Great with honey dressing".to_owned();
        Catalog::new(vec![tomatoes, honey, kale]).unwrap()
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        assert_eq!(catalog().categories(), ["All", "Vegetables", "Pantry"]);
    }

    #[test]
    fn test_filter_by_query_and_category() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.filter("", "All")), ["1", "2", "3"]);
        assert_eq!(ids(&catalog.filter("HONEY", "All")), ["2", "3"]);
        assert_eq!(ids(&catalog.filter("honey", "Vegetables")), ["3"]);
        assert_eq!(ids(&catalog.filter("", "Pantry")), ["2"]);
        assert!(catalog.filter("", "Dairy").is_empty());
    }

    #[test]
    fn test_select_skips_unknown_ids() {
        let catalog = catalog();
        let picked = catalog.select(&[ProductId::new("3"), ProductId::new("99")]);
        assert_eq!(ids(&picked), ["3"]);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let a = Product::new("1", "A", Price::ZERO, "X");
        let b = Product::new("1", "B", Price::ZERO, "X");
        assert!(matches!(
            Catalog::new(vec![a, b]),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_rejects_negative_price() {
        let json = r#"[{"id": "1", "name": "Kale", "price": -3, "category": "Vegetables"}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
