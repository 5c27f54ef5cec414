//! The owned store object and its asynchronous effects.
//!
//! `CatalogStore` glues the pieces together: every state change, including
//! the outcome of network I/O, funnels through [`dispatch`] into the pure
//! reducers, and the derived-view cache refreshes after each reduction.
//! Effects are plain async methods that perform I/O through [`ApiClient`]
//! and feed outcome commands back in.
//!
//! In-flight requests are not cancelled when a newer one is dispatched: a
//! superseded fetch that resolves late will still reduce, so the last
//! successful reduction wins for shared fields. Known limitation, kept
//! deliberately.
//!
//! [`dispatch`]: CatalogStore::dispatch

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::warn;

use bazaar_core::{CartId, ProductId, UserId};

use crate::api::{ApiClient, mint_timestamp_id};
use crate::config::CatalogConfig;
use crate::persist::FavoritesStore;
use crate::store::command::{CartCommand, Command, ProductsCommand};
use crate::store::reducer::{reduce_cart, reduce_products};
use crate::store::selectors::{
    CatalogStats, DisplayRange, PageItem, SelectionStats, Views, catalog_stats,
    derive_categories, display_range, paginate, selection_stats, total_pages, visible_pages,
};
use crate::store::state::CatalogState;
use crate::types::{Cart, NewProduct, Product, ProductPatch};

/// The catalog/cart state container.
///
/// Explicitly constructed and owned by the consumer; pass it by reference
/// (or behind the consumer's own synchronization) to whatever renders it.
pub struct CatalogStore {
    state: CatalogState,
    client: ApiClient,
    views: Views,
    favorites_store: Option<Box<dyn FavoritesStore>>,
}

impl CatalogStore {
    /// Create a store talking to the API named in `config`.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_client(config, ApiClient::new(config))
    }

    /// Create a store with an existing client (shared connection pool).
    #[must_use]
    pub fn with_client(config: &CatalogConfig, client: ApiClient) -> Self {
        let state = CatalogState::new(config.page_size);
        let mut views = Views::default();
        views.refresh(&state.products, state.products_version());
        Self {
            state,
            client,
            views,
            favorites_store: None,
        }
    }

    /// The canonical state snapshot.
    #[must_use]
    pub const fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Attach a persistence mechanism for favorites and hydrate from it.
    pub fn attach_favorites_store(&mut self, store: Box<dyn FavoritesStore>) {
        if let Some(favorites) = store.load() {
            self.dispatch(ProductsCommand::HydrateFavorites(favorites));
        }
        self.favorites_store = Some(store);
    }

    /// Apply a command through the pure reducers and refresh derived views.
    pub fn dispatch(&mut self, command: impl Into<Command>) {
        let command = command.into();
        let favorites_may_change = matches!(
            command,
            Command::Products(
                ProductsCommand::ToggleFavorite(_)
                    | ProductsCommand::DeleteSucceeded(_)
                    | ProductsCommand::BulkDeleteCommitted(_)
                    | ProductsCommand::Reset
            )
        );

        match command {
            Command::Products(cmd) => {
                reduce_products(&mut self.state.products, cmd);
                self.state.bump_products_version();
            }
            Command::Cart(cmd) => reduce_cart(&mut self.state.cart, cmd),
        }

        self.views
            .refresh(&self.state.products, self.state.products_version());

        if favorites_may_change
            && let Some(store) = &self.favorites_store
        {
            store.save(&self.state.products.favorites);
        }
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// The filtered+sorted product list.
    #[must_use]
    pub fn filtered_sorted(&self) -> &[Product] {
        self.views.sorted()
    }

    /// The current page of the filtered+sorted list.
    #[must_use]
    pub fn paginated_products(&self) -> Vec<Product> {
        paginate(
            self.views.sorted(),
            self.state.products.current_page,
            self.state.products.page_size,
        )
    }

    /// Total page count for the filtered+sorted list, at least 1.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.views.sorted().len(), self.state.products.page_size)
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.state.products.current_page < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.state.products.current_page > 1
    }

    /// Aggregate statistics over the unfiltered collection.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        catalog_stats(&self.state.products.products)
    }

    /// Statistics over the bulk selection.
    #[must_use]
    pub fn selection_stats(&self) -> SelectionStats {
        selection_stats(
            &self.state.products.products,
            &self.state.products.selected_ids,
        )
    }

    /// Sorted unique category labels derived from the loaded products.
    #[must_use]
    pub fn derived_categories(&self) -> Vec<String> {
        derive_categories(&self.state.products.products)
    }

    /// "Showing start..end of total" label data for the current page.
    #[must_use]
    pub fn display_range(&self) -> DisplayRange {
        display_range(
            self.state.products.current_page,
            self.state.products.page_size,
            self.views.sorted().len(),
        )
    }

    /// Compressed pagination window around the current page.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<PageItem> {
        visible_pages(self.state.products.current_page, self.total_pages())
    }

    /// Whether a product is favorited.
    #[must_use]
    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.state.products.favorites.contains(&id)
    }

    /// Whether a product is bulk-selected.
    #[must_use]
    pub fn is_selected(&self, id: ProductId) -> bool {
        self.state.products.selected_ids.contains(&id)
    }

    // =========================================================================
    // Product effects
    // =========================================================================

    /// Fetch the product listing, replacing the collection on success.
    pub async fn load_products(&mut self, limit: Option<u32>) {
        self.dispatch(ProductsCommand::LoadRequested);
        match self.client.get_products(limit).await {
            Ok(products) => self.dispatch(ProductsCommand::LoadSucceeded(products)),
            Err(err) => self.dispatch(ProductsCommand::LoadFailed(format!(
                "Failed to load products: {err}"
            ))),
        }
    }

    /// Re-fetch the full product listing.
    pub async fn refresh_products(&mut self) {
        self.load_products(None).await;
    }

    /// Fetch one product into the detail view.
    pub async fn load_product(&mut self, id: ProductId) {
        self.dispatch(ProductsCommand::LoadOneRequested);
        match self.client.get_product(id).await {
            Ok(product) => self.dispatch(ProductsCommand::LoadOneSucceeded(product)),
            Err(err) => self.dispatch(ProductsCommand::LoadOneFailed(format!(
                "Failed to load product: {err}"
            ))),
        }
    }

    /// Fetch the products of one category, replacing the collection.
    pub async fn load_products_by_category(&mut self, category: &str) {
        self.dispatch(ProductsCommand::LoadRequested);
        match self.client.get_products_by_category(category).await {
            Ok(products) => self.dispatch(ProductsCommand::LoadSucceeded(products)),
            Err(err) => self.dispatch(ProductsCommand::LoadFailed(format!(
                "Failed to load products by category: {err}"
            ))),
        }
    }

    /// Fetch category labels; a failed read arrives as the empty fallback.
    pub async fn load_categories(&mut self) {
        self.dispatch(ProductsCommand::CategoriesRequested);
        let categories = self.client.get_categories().await;
        self.dispatch(ProductsCommand::CategoriesLoaded(categories));
    }

    /// Create a product (simulated write; the committed product is the
    /// locally synthesized one).
    pub async fn add_product(&mut self, new_product: NewProduct) {
        self.dispatch(ProductsCommand::AddRequested);
        match self.client.add_product(new_product).await {
            Ok(product) => self.dispatch(ProductsCommand::AddSucceeded(product)),
            Err(err) => self.dispatch(ProductsCommand::AddFailed(format!(
                "Failed to add product: {err}"
            ))),
        }
    }

    /// Update a product by merging a patch onto it (simulated write).
    /// An unknown id fails without touching the network.
    pub async fn update_product(&mut self, id: ProductId, patch: ProductPatch) {
        self.dispatch(ProductsCommand::UpdateRequested);
        let Some(current) = self
            .state
            .products
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
        else {
            self.dispatch(ProductsCommand::UpdateFailed(format!(
                "Failed to update product: unknown product id: {id}"
            )));
            return;
        };

        let merged = patch.merge_into(&current);
        match self.client.update_product(id, merged).await {
            Ok(product) => self.dispatch(ProductsCommand::UpdateSucceeded(product)),
            Err(err) => self.dispatch(ProductsCommand::UpdateFailed(format!(
                "Failed to update product: {err}"
            ))),
        }
    }

    /// Delete a product (simulated write).
    pub async fn delete_product(&mut self, id: ProductId) {
        self.dispatch(ProductsCommand::DeleteRequested);
        match self.client.delete_product(id).await {
            Ok(deleted) => self.dispatch(ProductsCommand::DeleteSucceeded(deleted)),
            Err(err) => self.dispatch(ProductsCommand::DeleteFailed(format!(
                "Failed to delete product: {err}"
            ))),
        }
    }

    /// Delete every bulk-selected product.
    ///
    /// One delete request per id, issued concurrently; when all complete,
    /// every targeted id is removed from products, favorites, and selection
    /// regardless of per-item outcomes (optimistic commit).
    pub async fn bulk_delete_selected(&mut self) {
        let ids = self.state.products.selected_ids.clone();
        if ids.is_empty() {
            return;
        }

        self.dispatch(ProductsCommand::BulkDeleteRequested);

        let mut deletes = JoinSet::new();
        for id in ids.clone() {
            let client = self.client.clone();
            deletes.spawn(async move { (id, client.delete_product(id).await) });
        }
        while let Some(joined) = deletes.join_next().await {
            match joined {
                Ok((_, Ok(_))) => {}
                Ok((id, Err(err))) => {
                    warn!(%id, "Bulk delete item failed; committing removal anyway: {err}");
                }
                Err(err) => warn!("Bulk delete task failed: {err}"),
            }
        }

        self.dispatch(ProductsCommand::BulkDeleteCommitted(ids));
    }

    // =========================================================================
    // Cart effects
    // =========================================================================

    /// Fetch the cart for a user.
    pub async fn load_cart(&mut self, user_id: UserId) {
        self.dispatch(CartCommand::LoadRequested(user_id));
        match self.client.get_cart_for_user(user_id).await {
            Ok(cart) => self.dispatch(CartCommand::LoadSucceeded(cart)),
            Err(err) => self.dispatch(CartCommand::LoadFailed(format!(
                "Failed to load cart: {err}"
            ))),
        }
    }

    /// Add units of a product to the cart, creating the cart lazily and
    /// merging into an existing line rather than duplicating it
    /// (simulated write).
    pub async fn add_to_cart(&mut self, user_id: UserId, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }

        self.dispatch(CartCommand::AddRequested);

        let (mut cart, freshly_created) = match self.state.cart.cart.clone() {
            Some(cart) => (cart, false),
            None => (
                Cart::new(CartId::new(mint_timestamp_id()), user_id, Utc::now()),
                true,
            ),
        };
        cart.merge_line(product_id, quantity);

        match self.client.save_cart(&cart, freshly_created).await {
            Ok(cart) => self.dispatch(CartCommand::Committed(cart)),
            Err(err) => self.dispatch(CartCommand::MutationFailed(format!(
                "Failed to update cart: {err}"
            ))),
        }
    }

    /// Remove a product's line from the cart.
    pub async fn remove_from_cart(&mut self, product_id: ProductId) {
        if self.state.cart.cart.is_none() {
            self.dispatch(CartCommand::MutationFailed("Cart not found".to_string()));
            return;
        }
        self.dispatch(CartCommand::RemoveLine(product_id));
        self.save_current_cart().await;
    }

    /// Change a line's quantity; zero removes the line.
    pub async fn update_cart_item_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if self.state.cart.cart.is_none() {
            self.dispatch(CartCommand::MutationFailed("Cart not found".to_string()));
            return;
        }
        self.dispatch(CartCommand::SetLineQuantity {
            product_id,
            quantity,
        });
        self.save_current_cart().await;
    }

    /// Empty the cart.
    pub async fn clear_cart(&mut self) {
        if self.state.cart.cart.is_none() {
            self.dispatch(CartCommand::MutationFailed("Cart not found".to_string()));
            return;
        }
        self.dispatch(CartCommand::Clear);
        self.save_current_cart().await;
    }

    /// Push the already-reduced cart to the server for realism.
    async fn save_current_cart(&mut self) {
        let Some(cart) = self.state.cart.cart.clone() else {
            return;
        };
        if let Err(err) = self.client.save_cart(&cart, false).await {
            warn!("Cart save skipped: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::state::DEFAULT_PAGE_SIZE;
    use crate::types::Rating;
    use rust_decimal::dec;
    use std::sync::{Arc, Mutex};

    fn product(id: i64, title: &str, price: rust_decimal::Decimal, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            description: format!("{title} description"),
            category: category.to_string(),
            image: format!("https://example.com/{id}.jpg"),
            rating: Some(Rating { rate: 4.0, count: 2 }),
        }
    }

    fn store_with_products(products: Vec<Product>) -> CatalogStore {
        let mut store = CatalogStore::new(&CatalogConfig::default());
        store.dispatch(ProductsCommand::LoadSucceeded(products));
        store
    }

    #[test]
    fn test_default_page_size_comes_from_config() {
        let store = CatalogStore::new(&CatalogConfig::default());
        assert_eq!(store.state().products.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_views_track_dispatches() {
        let mut store = store_with_products(vec![
            product(1, "Backpack", dec!(10), "a"),
            product(2, "Shirt", dec!(20), "b"),
        ]);
        assert_eq!(store.filtered_sorted().len(), 2);

        store.dispatch(ProductsCommand::SetSearchQuery("backpack".to_string()));
        assert_eq!(store.filtered_sorted().len(), 1);
        assert_eq!(store.total_pages(), 1);

        store.dispatch(ProductsCommand::ClearFilters);
        assert_eq!(store.filtered_sorted().len(), 2);
    }

    #[test]
    fn test_pagination_scenario() {
        let mut store = store_with_products(vec![
            product(1, "A", dec!(10), "a"),
            product(2, "B", dec!(20), "b"),
        ]);
        store.dispatch(ProductsCommand::SetPageSize(1));
        store.dispatch(ProductsCommand::SetPage(2));

        let page = store.paginated_products();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, ProductId::new(2));
        assert_eq!(store.total_pages(), 2);
        assert!(store.has_previous_page());
        assert!(!store.has_next_page());
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails_without_network() {
        let mut store = store_with_products(vec![product(1, "A", dec!(10), "a")]);
        store
            .update_product(ProductId::new(99), ProductPatch::default())
            .await;
        assert!(
            store
                .state()
                .products
                .error
                .as_deref()
                .is_some_and(|e| e.contains("unknown product id"))
        );
        // collection untouched
        assert_eq!(store.state().products.products.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_delete_with_empty_selection_is_noop() {
        let mut store = store_with_products(vec![product(1, "A", dec!(10), "a")]);
        let before = store.state().clone();
        store.bulk_delete_selected().await;
        assert_eq!(store.state(), &before);
    }

    #[derive(Default)]
    struct RecordingFavorites {
        saved: Arc<Mutex<Vec<Vec<ProductId>>>>,
        initial: Option<Vec<ProductId>>,
    }

    impl FavoritesStore for RecordingFavorites {
        fn load(&self) -> Option<Vec<ProductId>> {
            self.initial.clone()
        }

        fn save(&self, favorites: &[ProductId]) {
            if let Ok(mut saved) = self.saved.lock() {
                saved.push(favorites.to_vec());
            }
        }
    }

    #[test]
    fn test_favorites_hydrate_and_save() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut store = store_with_products(vec![product(1, "A", dec!(10), "a")]);
        store.attach_favorites_store(Box::new(RecordingFavorites {
            saved: Arc::clone(&saved),
            initial: Some(vec![ProductId::new(7)]),
        }));
        assert!(store.is_favorite(ProductId::new(7)));

        store.dispatch(ProductsCommand::ToggleFavorite(ProductId::new(1)));
        let snapshots = saved.lock().expect("lock");
        assert_eq!(
            snapshots.last(),
            Some(&vec![ProductId::new(7), ProductId::new(1)])
        );
    }
}
