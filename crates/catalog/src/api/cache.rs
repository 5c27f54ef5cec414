//! Cache types for catalog API responses.

use crate::types::Product;

/// Cached value types. Only reads are cached; cart state never is.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<String>),
}
