//! Typed commands processed by the pure reducers.
//!
//! Fetch-type operations come in request/success/failure triples; the
//! request variant is dispatched by the effect before its network call, the
//! outcome variant after. Everything else is a synchronous pure mutation.

use bazaar_core::{ProductId, UserId};

use crate::types::{Cart, Product, SortKey};

/// A command for either state family.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Products-family command.
    Products(ProductsCommand),
    /// Cart-family command.
    Cart(CartCommand),
}

impl From<ProductsCommand> for Command {
    fn from(cmd: ProductsCommand) -> Self {
        Self::Products(cmd)
    }
}

impl From<CartCommand> for Command {
    fn from(cmd: CartCommand) -> Self {
        Self::Cart(cmd)
    }
}

/// Commands for the products family.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductsCommand {
    // === Product listing ===
    /// A product list fetch started.
    LoadRequested,
    /// A product list fetch succeeded; replaces the collection wholesale.
    LoadSucceeded(Vec<Product>),
    /// A product list fetch failed.
    LoadFailed(String),

    // === Single product ===
    /// A single-product fetch started.
    LoadOneRequested,
    /// A single-product fetch succeeded.
    LoadOneSucceeded(Product),
    /// A single-product fetch failed.
    LoadOneFailed(String),

    // === Categories ===
    /// A category fetch started.
    CategoriesRequested,
    /// Category labels arrived (possibly the empty fallback).
    CategoriesLoaded(Vec<String>),

    // === Simulated CRUD ===
    /// A product create started.
    AddRequested,
    /// A product create committed with the locally synthesized product.
    AddSucceeded(Product),
    /// A product create failed validation.
    AddFailed(String),
    /// A product update started.
    UpdateRequested,
    /// A product update committed with the merged product.
    UpdateSucceeded(Product),
    /// A product update failed.
    UpdateFailed(String),
    /// A product delete started.
    DeleteRequested,
    /// A product delete committed.
    DeleteSucceeded(ProductId),
    /// A product delete failed.
    DeleteFailed(String),
    /// A bulk delete started.
    BulkDeleteRequested,
    /// A bulk delete completed; every targeted id is removed regardless of
    /// per-item outcomes.
    BulkDeleteCommitted(Vec<ProductId>),

    // === Filtering and search ===
    /// Set the search term; resets to page 1.
    SetSearchQuery(String),
    /// Set or clear the category filter; resets to page 1.
    SetCategory(Option<String>),
    /// Set or clear the sort key and direction.
    SetSort {
        /// Field to sort by; `None` keeps API order.
        key: Option<SortKey>,
        /// Sort direction.
        ascending: bool,
    },
    /// Reset search, category, sort, and page.
    ClearFilters,

    // === Pagination ===
    /// Jump to a page; ignored when outside `[1, total_pages]`.
    SetPage(usize),
    /// Change the page size (clamped to at least 1); resets to page 1.
    SetPageSize(usize),
    /// Advance one page when possible.
    NextPage,
    /// Go back one page when possible.
    PreviousPage,

    // === Selection and favorites ===
    /// Toggle a product in or out of the favorites set.
    ToggleFavorite(ProductId),
    /// Toggle a product in or out of the bulk selection.
    ToggleSelection(ProductId),
    /// Select every product in the collection.
    SelectAll,
    /// Empty the bulk selection.
    ClearSelection,
    /// Replace favorites from a persistence source.
    HydrateFavorites(Vec<ProductId>),

    // === Housekeeping ===
    /// Drop the detail-view product.
    ClearSelectedProduct,
    /// Drop the recorded error.
    ClearError,
    /// Return to the initial state.
    Reset,
}

/// Commands for the cart family.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    /// A cart fetch started for a user.
    LoadRequested(UserId),
    /// A cart fetch succeeded.
    LoadSucceeded(Cart),
    /// A cart fetch failed.
    LoadFailed(String),
    /// An add-to-cart started.
    AddRequested,
    /// A cart mutation committed with the locally maintained cart.
    Committed(Cart),
    /// A cart mutation failed.
    MutationFailed(String),
    /// Remove a product's line.
    RemoveLine(ProductId),
    /// Set a line's quantity; zero removes the line.
    SetLineQuantity {
        /// Product whose line changes.
        product_id: ProductId,
        /// New quantity; zero removes the line.
        quantity: u32,
    },
    /// Empty the cart, keeping the cart itself.
    Clear,
}
