//! Product reference data and cart lines.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A catalog product.
///
/// Products are immutable reference data. Cart lines and order lines carry a
/// full copy, so a later catalog change never rewrites either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub rating: f32,
    /// Number of reviews behind `rating`.
    #[serde(default)]
    pub reviews: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
}

impl Product {
    /// Build a product with the required fields and everything else empty.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Price,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            image: String::new(),
            category: category.into(),
            is_local: false,
            is_organic: false,
            farm_name: None,
            rating: 0.0,
            reviews: 0,
            images: Vec::new(),
            nutrition_info: None,
            origin: None,
            certifications: Vec::new(),
        }
    }

    /// Case-insensitive match of an already-lowercased query against the
    /// name or description.
    #[must_use]
    pub fn matches_query(&self, lowercase_query: &str) -> bool {
        lowercase_query.is_empty()
            || self.name.to_lowercase().contains(lowercase_query)
            || self.description.to_lowercase().contains(lowercase_query)
    }
}

/// One cart line. The cart keeps at most one line per product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1 while the line is in a cart.
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case_blob() {
        let json = r#"{
            "id": "1",
            "name": "Heirloom Tomatoes",
            "description": "Vine ripened",
            "price": 4.99,
            "image": "https://img/tomato.jpg",
            "category": "Vegetables",
            "isLocal": true,
            "isOrganic": false,
            "farmName": "Sunny Acres",
            "rating": 4.8,
            "reviews": 124
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "1");
        assert!(product.is_local);
        assert_eq!(product.farm_name.as_deref(), Some("Sunny Acres"));
        assert_eq!(product.price, Price::from_cents(499));
        assert!(product.certifications.is_empty());
    }

    #[test]
    fn test_matches_query_name_or_description() {
        let mut product = Product::new("1", "Raw Honey", Price::from_cents(1200), "Pantry");
        product.description = "Wildflower blend".to_owned();

        assert!(product.matches_query("honey"));
        assert!(product.matches_query("wildflower"));
        assert!(product.matches_query(""));
        assert!(!product.matches_query("apple"));
    }

    #[test]
    fn test_line_total() {
        let product = Product::new("1", "Eggs", Price::from_cents(550), "Dairy");
        let line = CartItem {
            product,
            quantity: 3,
        };
        assert_eq!(line.line_total(), Price::from_cents(1650));
    }
}
