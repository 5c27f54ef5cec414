//! Pure state-transition functions.
//!
//! No I/O happens here: reducers take the current state and a command and
//! mutate the state in place, synchronously. Effects call these through
//! `CatalogStore::dispatch`; tests can call them directly.

use bazaar_core::ProductId;

use crate::store::command::{CartCommand, ProductsCommand};
use crate::store::selectors::{filtered_len, total_pages};
use crate::store::state::{CartState, ProductsState};

/// Apply a products-family command.
#[allow(clippy::too_many_lines)]
pub fn reduce_products(state: &mut ProductsState, command: ProductsCommand) {
    match command {
        // === Product listing ===
        ProductsCommand::LoadRequested
        | ProductsCommand::LoadOneRequested
        | ProductsCommand::CategoriesRequested
        | ProductsCommand::AddRequested
        | ProductsCommand::UpdateRequested
        | ProductsCommand::DeleteRequested
        | ProductsCommand::BulkDeleteRequested => {
            state.loading = true;
            state.error = None;
        }
        ProductsCommand::LoadSucceeded(products) => {
            state.products = products;
            state.loading = false;
            state.error = None;
            clamp_page(state);
        }
        ProductsCommand::LoadOneSucceeded(product) => {
            state.selected_product = Some(product);
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::CategoriesLoaded(categories) => {
            state.categories = categories;
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::AddSucceeded(product) => {
            state.products.push(product);
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::UpdateSucceeded(product) => {
            if let Some(existing) = state.products.iter_mut().find(|p| p.id == product.id) {
                *existing = product.clone();
            }
            if state
                .selected_product
                .as_ref()
                .is_some_and(|p| p.id == product.id)
            {
                state.selected_product = Some(product);
            }
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::DeleteSucceeded(id) => {
            remove_products(state, &[id]);
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::BulkDeleteCommitted(ids) => {
            remove_products(state, &ids);
            state.loading = false;
            state.error = None;
        }
        ProductsCommand::LoadFailed(error)
        | ProductsCommand::LoadOneFailed(error)
        | ProductsCommand::AddFailed(error)
        | ProductsCommand::UpdateFailed(error)
        | ProductsCommand::DeleteFailed(error) => {
            state.loading = false;
            state.error = Some(error);
        }

        // === Filtering and search ===
        ProductsCommand::SetSearchQuery(query) => {
            state.search_query = query;
            state.current_page = 1;
        }
        ProductsCommand::SetCategory(category) => {
            state.selected_category = category;
            state.current_page = 1;
        }
        ProductsCommand::SetSort { key, ascending } => {
            state.sort_key = key;
            state.sort_ascending = ascending;
        }
        ProductsCommand::ClearFilters => {
            state.search_query.clear();
            state.selected_category = None;
            state.sort_key = None;
            state.sort_ascending = true;
            state.current_page = 1;
        }

        // === Pagination ===
        ProductsCommand::SetPage(page) => {
            let pages = total_pages(filtered_len(state), state.page_size);
            if (1..=pages).contains(&page) {
                state.current_page = page;
            }
        }
        ProductsCommand::SetPageSize(size) => {
            state.page_size = size.max(1);
            state.current_page = 1;
        }
        ProductsCommand::NextPage => {
            let pages = total_pages(filtered_len(state), state.page_size);
            if state.current_page < pages {
                state.current_page += 1;
            }
        }
        ProductsCommand::PreviousPage => {
            if state.current_page > 1 {
                state.current_page -= 1;
            }
        }

        // === Selection and favorites ===
        ProductsCommand::ToggleFavorite(id) => toggle_membership(&mut state.favorites, id),
        ProductsCommand::ToggleSelection(id) => toggle_membership(&mut state.selected_ids, id),
        ProductsCommand::SelectAll => {
            state.selected_ids = state.products.iter().map(|p| p.id).collect();
        }
        ProductsCommand::ClearSelection => state.selected_ids.clear(),
        ProductsCommand::HydrateFavorites(favorites) => state.favorites = favorites,

        // === Housekeeping ===
        ProductsCommand::ClearSelectedProduct => state.selected_product = None,
        ProductsCommand::ClearError => state.error = None,
        ProductsCommand::Reset => *state = ProductsState::new(state.initial_page_size),
    }
}

/// Apply a cart-family command.
pub fn reduce_cart(state: &mut CartState, command: CartCommand) {
    match command {
        CartCommand::LoadRequested(user_id) => {
            state.loading = true;
            state.error = None;
            state.user_id = Some(user_id);
        }
        CartCommand::LoadSucceeded(cart) | CartCommand::Committed(cart) => {
            state.cart = Some(cart);
            state.loading = false;
            state.error = None;
        }
        CartCommand::LoadFailed(error) | CartCommand::MutationFailed(error) => {
            state.loading = false;
            state.error = Some(error);
        }
        CartCommand::AddRequested => {
            state.loading = true;
            state.error = None;
        }
        CartCommand::RemoveLine(product_id) => {
            if let Some(cart) = state.cart.as_mut() {
                cart.remove_line(product_id);
            }
        }
        CartCommand::SetLineQuantity {
            product_id,
            quantity,
        } => {
            if let Some(cart) = state.cart.as_mut() {
                cart.set_line_quantity(product_id, quantity);
            }
        }
        CartCommand::Clear => {
            if let Some(cart) = state.cart.as_mut() {
                cart.products.clear();
            }
        }
    }
}

/// Symmetric-difference membership toggle preserving insertion order.
fn toggle_membership(ids: &mut Vec<ProductId>, id: ProductId) {
    if ids.contains(&id) {
        ids.retain(|existing| *existing != id);
    } else {
        ids.push(id);
    }
}

/// Remove products by id, keeping favorites, selection, the detail view,
/// and the page invariant consistent with the shrunken collection.
fn remove_products(state: &mut ProductsState, ids: &[ProductId]) {
    state.products.retain(|p| !ids.contains(&p.id));
    state.favorites.retain(|id| !ids.contains(id));
    state.selected_ids.retain(|id| !ids.contains(id));
    if state
        .selected_product
        .as_ref()
        .is_some_and(|p| ids.contains(&p.id))
    {
        state.selected_product = None;
    }
    clamp_page(state);
}

/// Pull `current_page` back into `[1, total_pages]` after the collection
/// changed underneath it.
fn clamp_page(state: &mut ProductsState) {
    let pages = total_pages(filtered_len(state), state.page_size);
    state.current_page = state.current_page.clamp(1, pages);
}
