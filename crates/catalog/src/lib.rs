//! Bazaar Catalog - catalog/cart state engine over the Fake Store API.
//!
//! This crate owns the canonical in-memory snapshot of a product catalog
//! and a shopping cart, keeps it in sync with the Fake Store REST API, and
//! exposes pure derived views (filtering, sorting, pagination, aggregate
//! statistics) over it. It is a library for view layers to consume; it
//! renders nothing itself.
//!
//! # Architecture
//!
//! - [`api`] - typed HTTP wrappers with timeout/retry and a read cache;
//!   write endpoints are simulated because the backing API does not
//!   durably persist writes
//! - [`store`] - typed commands, pure reducers, async effects, and the
//!   memoized derived-view layer
//! - [`persist`] - optional favorites persistence
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_catalog::{CatalogConfig, CatalogStore};
//! use bazaar_catalog::store::ProductsCommand;
//!
//! let config = CatalogConfig::from_env()?;
//! let mut store = CatalogStore::new(&config);
//!
//! store.load_products(None).await;
//! store.dispatch(ProductsCommand::SetSearchQuery("backpack".into()));
//! for product in store.paginated_products() {
//!     println!("{} - {}", product.title, product.price);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod persist;
pub mod store;
pub mod types;

pub use api::ApiClient;
pub use config::{CatalogConfig, ConfigError};
pub use error::ApiError;
pub use store::{CatalogStore, SearchDebouncer};
pub use types::{Cart, CartItem, NewProduct, Product, ProductPatch, Rating, SortKey};
