//! Canonical state snapshots for the products and cart families.

use bazaar_core::{ProductId, UserId};

use crate::types::{Cart, Product, SortKey};

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Canonical products-family state: the product collection plus every piece
/// of filter, sort, pagination, and selection bookkeeping derived views read.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductsState {
    /// The product collection; replaced wholesale on list-fetch success.
    pub products: Vec<Product>,
    /// Product loaded for the detail view, if any.
    pub selected_product: Option<Product>,
    /// Category labels fetched from the API (distinct from the labels
    /// derivable from `products`).
    pub categories: Vec<String>,
    /// Whether a products-family request is in flight.
    pub loading: bool,
    /// Message from the most recent failure, cleared on the next request.
    pub error: Option<String>,
    /// Case-insensitive search term; empty means no filtering.
    pub search_query: String,
    /// Exact-match category filter.
    pub selected_category: Option<String>,
    /// Field the derived view sorts by; `None` keeps API order.
    pub sort_key: Option<SortKey>,
    /// Sort direction.
    pub sort_ascending: bool,
    /// 1-based current page; always within `[1, total_pages]`.
    pub current_page: usize,
    /// Page size; always at least 1.
    pub page_size: usize,
    /// Favorited product ids, in toggle order.
    pub favorites: Vec<ProductId>,
    /// Bulk-selected product ids, in toggle order.
    pub selected_ids: Vec<ProductId>,
    /// Page size restored by `Reset`.
    pub initial_page_size: usize,
}

impl ProductsState {
    /// Initial state with the given page size.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            products: Vec::new(),
            selected_product: None,
            categories: Vec::new(),
            loading: false,
            error: None,
            search_query: String::new(),
            selected_category: None,
            sort_key: None,
            sort_ascending: true,
            current_page: 1,
            page_size,
            favorites: Vec::new(),
            selected_ids: Vec::new(),
            initial_page_size: page_size,
        }
    }
}

impl Default for ProductsState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Canonical cart-family state. At most one cart is tracked client-side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// The tracked cart; created lazily on first add-to-cart.
    pub cart: Option<Cart>,
    /// Whether a cart-family request is in flight.
    pub loading: bool,
    /// Message from the most recent failure, cleared on the next request.
    pub error: Option<String>,
    /// User whose cart is tracked.
    pub user_id: Option<UserId>,
}

/// The whole canonical snapshot, with a per-family change counter the
/// derived-view cache keys on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Products family.
    pub products: ProductsState,
    /// Cart family.
    pub cart: CartState,
    products_version: u64,
}

impl CatalogState {
    /// Initial state with the given products page size.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            products: ProductsState::new(page_size),
            cart: CartState::default(),
            products_version: 0,
        }
    }

    /// Monotonic counter bumped on every products-family reduction.
    #[must_use]
    pub const fn products_version(&self) -> u64 {
        self.products_version
    }

    pub(crate) fn bump_products_version(&mut self) {
        self.products_version = self.products_version.wrapping_add(1);
    }
}
