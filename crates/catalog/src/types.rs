//! Domain types for the Fake Store catalog API.
//!
//! These mirror the JSON shapes the API serves, with typed ids and decimal
//! prices in place of bare numbers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CartId, ProductId, UserId};

use crate::error::ApiError;

// =============================================================================
// Product Types
// =============================================================================

/// Review rating attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating value (e.g., 3.9).
    pub rate: f64,
    /// Number of reviews behind the average.
    pub count: u64,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Price in the store currency; always positive.
    pub price: Decimal,
    /// Plain text description.
    pub description: String,
    /// Free-text category label.
    pub category: String,
    /// Image URL.
    pub image: String,
    /// Review rating, when the API provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

/// Input for creating a product: a [`Product`] minus id and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Product title.
    pub title: String,
    /// Price in the store currency; must be positive.
    pub price: Decimal,
    /// Plain text description.
    pub description: String,
    /// Free-text category label.
    pub category: String,
    /// Image URL.
    pub image: String,
}

impl NewProduct {
    /// Reject incomplete input before any network I/O.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when a required field is empty or the
    /// price is not positive.
    pub fn validate(&self) -> Result<(), ApiError> {
        let missing = [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("image", &self.image),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(ApiError::Validation(format!("{field} must not be empty")));
        }
        if self.price <= Decimal::ZERO {
            return Err(ApiError::Validation("price must be positive".to_string()));
        }
        Ok(())
    }

    /// Promote the input to a full product under a freshly minted id.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            price: self.price,
            description: self.description,
            category: self.category,
            image: self.image,
            rating: Some(Rating {
                rate: 0.0,
                count: 0,
            }),
        }
    }
}

/// Partial update for a product; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    /// New title, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New price, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// New description, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New image URL, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductPatch {
    /// Merge the set fields onto an existing product.
    #[must_use]
    pub fn merge_into(&self, product: &Product) -> Product {
        let mut merged = product.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(image) = &self.image {
            merged.image = image.clone();
        }
        merged
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A (product, quantity) line in a cart. Quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Units of the product; never 0 (such lines are removed).
    pub quantity: u32,
}

/// A user's shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    /// Cart lines; product ids are unique within a cart.
    pub products: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart for a user.
    #[must_use]
    pub fn new(id: CartId, user_id: UserId, date: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            date,
            products: Vec::new(),
        }
    }

    /// Add `quantity` units of a product, merging into an existing line
    /// rather than duplicating it.
    pub fn merge_line(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.products.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += quantity;
        } else {
            self.products.push(CartItem {
                product_id,
                quantity,
            });
        }
    }

    /// Remove the line for a product, if present.
    pub fn remove_line(&mut self, product_id: ProductId) {
        self.products.retain(|l| l.product_id != product_id);
    }

    /// Set the quantity of an existing line. Zero removes the line.
    pub fn set_line_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_line(product_id);
            return;
        }
        if let Some(line) = self.products.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.products.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Sort Keys
// =============================================================================

/// Product fields the derived-view layer can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Sort by id.
    Id,
    /// Sort by title.
    Title,
    /// Sort by price.
    Price,
    /// Sort by description.
    Description,
    /// Sort by category.
    Category,
    /// Sort by average rating; products without one compare equal.
    Rating,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: dec!(109.95),
            description: "Fits 15in laptops".to_string(),
            category: "men's clothing".to_string(),
            image: "https://example.com/1.jpg".to_string(),
            rating: Some(Rating {
                rate: 3.9,
                count: 120,
            }),
        }
    }

    #[test]
    fn test_product_wire_shape() {
        let json = r#"{
            "id": 1,
            "title": "Backpack",
            "price": 109.95,
            "description": "Fits 15in laptops",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product, sample_product());
    }

    #[test]
    fn test_product_without_rating() {
        let json = r#"{
            "id": 2,
            "title": "Mug",
            "price": 4.5,
            "description": "Holds coffee",
            "category": "kitchen",
            "image": "https://example.com/2.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_cart_wire_shape_uses_camel_case() {
        let json = r#"{
            "id": 1,
            "userId": 1,
            "date": "2020-03-02T00:00:00.000Z",
            "products": [{ "productId": 1, "quantity": 4 }]
        }"#;
        let cart: Cart = serde_json::from_str(json).expect("deserialize");
        assert_eq!(cart.user_id, UserId::new(1));
        assert_eq!(cart.products[0].product_id, ProductId::new(1));
        assert_eq!(cart.products[0].quantity, 4);

        let round = serde_json::to_value(&cart).expect("serialize");
        assert!(round.get("userId").is_some());
        assert!(round["products"][0].get("productId").is_some());
    }

    #[test]
    fn test_new_product_validation() {
        let valid = NewProduct {
            title: "Lamp".to_string(),
            price: dec!(19.99),
            description: "Desk lamp".to_string(),
            category: "home".to_string(),
            image: "https://example.com/lamp.jpg".to_string(),
        };
        assert!(valid.validate().is_ok());

        let mut empty_title = valid.clone();
        empty_title.title = "  ".to_string();
        assert!(matches!(
            empty_title.validate(),
            Err(ApiError::Validation(msg)) if msg.contains("title")
        ));

        let mut free = valid;
        free.price = Decimal::ZERO;
        assert!(matches!(free.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let product = sample_product();
        let patch = ProductPatch {
            price: Some(dec!(89.99)),
            ..ProductPatch::default()
        };
        let merged = patch.merge_into(&product);
        assert_eq!(merged.price, dec!(89.99));
        assert_eq!(merged.title, product.title);
        assert_eq!(merged.rating, product.rating);
    }

    #[test]
    fn test_cart_merge_line() {
        let mut cart = Cart::new(CartId::new(1), UserId::new(1), Utc::now());
        cart.merge_line(ProductId::new(5), 2);
        cart.merge_line(ProductId::new(5), 3);
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].quantity, 5);
    }

    #[test]
    fn test_cart_zero_quantity_removes_line() {
        let mut cart = Cart::new(CartId::new(1), UserId::new(1), Utc::now());
        cart.merge_line(ProductId::new(5), 2);
        cart.set_line_quantity(ProductId::new(5), 0);
        assert!(cart.products.is_empty());
    }
}
