//! Pure derived views over the canonical state.
//!
//! The pipeline is order-sensitive: filter, then sort, then paginate.
//! Everything here is deterministic for a given state; the [`Views`] memo
//! caches the filtered+sorted vector and refreshes it only when the
//! products-family version changes.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use bazaar_core::ProductId;

use crate::store::state::ProductsState;
use crate::types::{Product, SortKey};

/// Pages shown on each side of the current page in the pagination window.
const PAGE_WINDOW_RADIUS: usize = 2;

// =============================================================================
// Filter / Sort / Paginate
// =============================================================================

/// Whether a product matches the (already lowercased) search term and the
/// category filter.
fn matches(product: &Product, query: &str, category: Option<&str>) -> bool {
    if !query.is_empty()
        && !product.title.to_lowercase().contains(query)
        && !product.description.to_lowercase().contains(query)
        && !product.category.to_lowercase().contains(query)
    {
        return false;
    }
    category.is_none_or(|c| product.category == c)
}

/// Keep products whose title, description, or category contains the search
/// term case-insensitively AND whose category equals the selected one.
/// An empty query is the identity.
#[must_use]
pub fn filter_products(
    products: &[Product],
    query: &str,
    category: Option<&str>,
) -> Vec<Product> {
    let query = query.to_lowercase();
    products
        .iter()
        .filter(|p| matches(p, &query, category))
        .cloned()
        .collect()
}

/// Number of products the filter keeps, without materializing them.
#[must_use]
pub fn filtered_len(state: &ProductsState) -> usize {
    let query = state.search_query.to_lowercase();
    state
        .products
        .iter()
        .filter(|p| matches(p, &query, state.selected_category.as_deref()))
        .count()
}

/// Case-insensitive string ordering standing in for a locale-aware compare.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_by(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Price => a.price.cmp(&b.price),
        SortKey::Description => compare_text(&a.description, &b.description),
        SortKey::Category => compare_text(&a.category, &b.category),
        // Products without a rating compare equal, so they keep their
        // relative order under the stable sort.
        SortKey::Rating => match (&a.rating, &b.rating) {
            (Some(ra), Some(rb)) => ra.rate.partial_cmp(&rb.rate).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Stable sort by the given key. `None` keeps the incoming order.
#[must_use]
pub fn sort_products(
    mut products: Vec<Product>,
    key: Option<SortKey>,
    ascending: bool,
) -> Vec<Product> {
    if let Some(key) = key {
        products.sort_by(|a, b| {
            let ord = compare_by(a, b, key);
            if ascending { ord } else { ord.reverse() }
        });
    }
    products
}

/// Total page count: `ceil(len / page_size)`, never less than 1.
#[must_use]
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// The `[(page-1)*size, page*size)` slice of the sorted result.
#[must_use]
pub fn paginate(products: &[Product], page: usize, page_size: usize) -> Vec<Product> {
    let page = page.max(1);
    let start = (page - 1) * page_size;
    products.iter().skip(start).take(page_size).cloned().collect()
}

// =============================================================================
// Aggregates
// =============================================================================

/// Aggregate statistics over the UNFILTERED product collection. Statistics
/// are global, not filtered-view-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogStats {
    /// Number of products.
    pub total: usize,
    /// Number of distinct categories.
    pub categories_count: usize,
    /// Mean price, rounded to 2 decimal places.
    pub average_price: Decimal,
    /// Highest price.
    pub highest_price: Decimal,
    /// Lowest price.
    pub lowest_price: Decimal,
    /// Sum of all prices.
    pub total_value: Decimal,
}

/// Compute [`CatalogStats`] for a product collection.
#[must_use]
pub fn catalog_stats(products: &[Product]) -> CatalogStats {
    if products.is_empty() {
        return CatalogStats::default();
    }

    let categories: BTreeSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    let total_value: Decimal = products.iter().map(|p| p.price).sum();
    let highest_price = products.iter().map(|p| p.price).max().unwrap_or_default();
    let lowest_price = products.iter().map(|p| p.price).min().unwrap_or_default();

    CatalogStats {
        total: products.len(),
        categories_count: categories.len(),
        average_price: (total_value / Decimal::from(products.len())).round_dp(2),
        highest_price,
        lowest_price,
        total_value,
    }
}

/// Statistics over the bulk-selected products.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionStats {
    /// Number of selected ids.
    pub count: usize,
    /// Sum of the selected products' prices, rounded to 2 decimal places.
    pub total_price: Decimal,
    /// Number of distinct categories among the selected products.
    pub categories: usize,
}

/// Compute [`SelectionStats`] for the current selection.
#[must_use]
pub fn selection_stats(products: &[Product], selected_ids: &[ProductId]) -> SelectionStats {
    let selected: Vec<&Product> = products
        .iter()
        .filter(|p| selected_ids.contains(&p.id))
        .collect();
    let categories: BTreeSet<&str> = selected.iter().map(|p| p.category.as_str()).collect();
    SelectionStats {
        count: selected_ids.len(),
        total_price: selected
            .iter()
            .map(|p| p.price)
            .sum::<Decimal>()
            .round_dp(2),
        categories: categories.len(),
    }
}

/// Sorted unique category labels derived from the product collection.
#[must_use]
pub fn derive_categories(products: &[Product]) -> Vec<String> {
    let set: BTreeSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

// =============================================================================
// Pagination UI helpers
// =============================================================================

/// 1-based "showing start..end of total" label data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    /// First visible item index, or 0 when empty.
    pub start: usize,
    /// Last visible item index, or 0 when empty.
    pub end: usize,
    /// Number of items in the filtered+sorted result.
    pub total: usize,
}

/// Compute the visible-item range for the current page.
#[must_use]
pub fn display_range(current_page: usize, page_size: usize, total: usize) -> DisplayRange {
    if total == 0 {
        return DisplayRange {
            start: 0,
            end: 0,
            total,
        };
    }
    let start = (current_page - 1) * page_size + 1;
    let end = (current_page * page_size).min(total);
    DisplayRange { start, end, total }
}

/// One slot in the compressed pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A navigable page number.
    Page(usize),
    /// An ellipsis between non-adjacent pages.
    Gap,
}

/// Compressed page-number sequence around the current page: the first and
/// last page always, a window of radius 2 around the current page, and gap
/// markers where pages are elided.
#[must_use]
pub fn visible_pages(current_page: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return vec![PageItem::Page(1)];
    }

    let low = current_page.saturating_sub(PAGE_WINDOW_RADIUS).max(2);
    let high = (current_page + PAGE_WINDOW_RADIUS).min(total_pages - 1);

    let mut items = vec![PageItem::Page(1)];
    if current_page > PAGE_WINDOW_RADIUS + 2 {
        items.push(PageItem::Gap);
    }
    items.extend((low..=high).map(PageItem::Page));
    if current_page + PAGE_WINDOW_RADIUS + 1 < total_pages {
        items.push(PageItem::Gap);
    }
    items.push(PageItem::Page(total_pages));
    items
}

// =============================================================================
// Memoized view cache
// =============================================================================

/// Version-checked cache of the filtered+sorted product list.
///
/// Refreshed by `CatalogStore::dispatch` after every reduction; the version
/// check makes cart-only reductions free.
#[derive(Debug, Default)]
pub(crate) struct Views {
    version: Option<u64>,
    sorted: Vec<Product>,
}

impl Views {
    /// Recompute the cached pipeline output if `version` moved.
    pub(crate) fn refresh(&mut self, state: &ProductsState, version: u64) {
        if self.version == Some(version) {
            return;
        }
        let filtered = filter_products(
            &state.products,
            &state.search_query,
            state.selected_category.as_deref(),
        );
        self.sorted = sort_products(filtered, state.sort_key, state.sort_ascending);
        self.version = Some(version);
    }

    /// The filtered+sorted products as of the last refresh.
    pub(crate) fn sorted(&self) -> &[Product] {
        &self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use rust_decimal::dec;

    fn product(id: i64, title: &str, price: Decimal, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            description: format!("{title} description"),
            category: category.to_string(),
            image: format!("https://example.com/{id}.jpg"),
            rating: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, "Gold Ring", dec!(168.0), "jewelery"),
            product(2, "Backpack", dec!(109.95), "men's clothing"),
            product(3, "Cotton Shirt", dec!(22.3), "men's clothing"),
            product(4, "Monitor", dec!(999.99), "electronics"),
        ]
    }

    #[test]
    fn test_empty_query_is_identity() {
        let products = sample();
        assert_eq!(filter_products(&products, "", None), products);
    }

    #[test]
    fn test_filter_is_case_insensitive_over_three_fields() {
        let products = sample();
        // title
        assert_eq!(filter_products(&products, "BACK", None).len(), 1);
        // description
        assert_eq!(filter_products(&products, "monitor desc", None).len(), 1);
        // category
        assert_eq!(filter_products(&products, "JEWEL", None).len(), 1);
        // no match
        assert!(filter_products(&products, "zzz", None).is_empty());
    }

    #[test]
    fn test_filter_combines_query_and_category() {
        let products = sample();
        let hits = filter_products(&products, "shirt", Some("men's clothing"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ProductId::new(3));

        // query matches but category does not
        assert!(filter_products(&products, "shirt", Some("electronics")).is_empty());
    }

    #[test]
    fn test_sort_by_price_both_directions() {
        let asc = sort_products(sample(), Some(SortKey::Price), true);
        let prices: Vec<Decimal> = asc.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(22.3), dec!(109.95), dec!(168.0), dec!(999.99)]);

        let desc = sort_products(sample(), Some(SortKey::Price), false);
        assert_eq!(desc[0].price, dec!(999.99));
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut products = sample();
        products[0].title = "aardvark".to_string();
        products[1].title = "Zebra".to_string();
        let sorted = sort_products(products, Some(SortKey::Title), true);
        assert_eq!(sorted[0].title, "aardvark");
        assert_eq!(sorted.last().map(|p| p.title.as_str()), Some("Zebra"));
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut products = sample();
        // two equal-priced products keep their original relative order
        products[2].price = dec!(109.95);
        let once = sort_products(products, Some(SortKey::Price), true);
        let positions: Vec<i64> = once.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(positions, vec![2, 3, 1, 4]);

        let twice = sort_products(once.clone(), Some(SortKey::Price), true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unrated_products_compare_equal() {
        let mut products = sample();
        products[0].rating = Some(Rating {
            rate: 4.5,
            count: 10,
        });
        // products 2..4 unrated: stable sort keeps their order
        let sorted = sort_products(products.clone(), Some(SortKey::Rating), true);
        let tail: Vec<i64> = sorted.iter().skip(1).map(|p| p.id.as_i64()).collect();
        assert!(sorted.iter().any(|p| p.id == ProductId::new(1)));
        assert_eq!(tail.len(), 3);
    }

    #[test]
    fn test_total_pages_formula() {
        assert_eq!(total_pages(0, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(3, 1), 3);
    }

    #[test]
    fn test_pagination_slice() {
        let products = vec![
            product(1, "A", dec!(10), "a"),
            product(2, "B", dec!(20), "b"),
        ];
        let page2 = paginate(&products, 2, 1);
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].id, ProductId::new(2));
        assert_eq!(total_pages(products.len(), 1), 2);

        // past-the-end page is empty, not a panic
        assert!(paginate(&products, 5, 1).is_empty());
    }

    #[test]
    fn test_catalog_stats_are_global() {
        let stats = catalog_stats(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.categories_count, 3);
        assert_eq!(stats.highest_price, dec!(999.99));
        assert_eq!(stats.lowest_price, dec!(22.3));
        assert_eq!(stats.total_value, dec!(1300.24));
        assert_eq!(stats.average_price, dec!(325.06));
    }

    #[test]
    fn test_catalog_stats_empty() {
        assert_eq!(catalog_stats(&[]), CatalogStats::default());
    }

    #[test]
    fn test_selection_stats() {
        let products = sample();
        let selected = vec![ProductId::new(2), ProductId::new(3)];
        let stats = selection_stats(&products, &selected);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_price, dec!(132.25));
        assert_eq!(stats.categories, 1);
    }

    #[test]
    fn test_derive_categories_sorted_unique() {
        assert_eq!(
            derive_categories(&sample()),
            vec!["electronics", "jewelery", "men's clothing"]
        );
    }

    #[test]
    fn test_display_range() {
        assert_eq!(
            display_range(2, 12, 30),
            DisplayRange {
                start: 13,
                end: 24,
                total: 30
            }
        );
        assert_eq!(
            display_range(1, 12, 0),
            DisplayRange {
                start: 0,
                end: 0,
                total: 0
            }
        );
    }

    #[test]
    fn test_visible_pages_small_counts() {
        assert_eq!(visible_pages(1, 1), vec![PageItem::Page(1)]);
        assert_eq!(
            visible_pages(1, 2),
            vec![PageItem::Page(1), PageItem::Page(2)]
        );
        assert_eq!(
            visible_pages(2, 3),
            vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
        );
    }

    #[test]
    fn test_visible_pages_gaps_both_sides() {
        let items = visible_pages(5, 10);
        assert_eq!(
            items,
            vec![
                PageItem::Page(1),
                PageItem::Gap,
                PageItem::Page(3),
                PageItem::Page(4),
                PageItem::Page(5),
                PageItem::Page(6),
                PageItem::Page(7),
                PageItem::Gap,
                PageItem::Page(10),
            ]
        );
    }

    #[test]
    fn test_visible_pages_near_edges() {
        assert_eq!(
            visible_pages(1, 10),
            vec![
                PageItem::Page(1),
                PageItem::Page(2),
                PageItem::Page(3),
                PageItem::Gap,
                PageItem::Page(10),
            ]
        );
        assert_eq!(
            visible_pages(10, 10),
            vec![
                PageItem::Page(1),
                PageItem::Gap,
                PageItem::Page(8),
                PageItem::Page(9),
                PageItem::Page(10),
            ]
        );
    }

    #[test]
    fn test_views_cache_refreshes_on_version_change() {
        let mut state = ProductsState::default();
        state.products = sample();
        let mut views = Views::default();

        views.refresh(&state, 1);
        assert_eq!(views.sorted().len(), 4);

        // same version: stale state is NOT picked up
        state.search_query = "backpack".to_string();
        views.refresh(&state, 1);
        assert_eq!(views.sorted().len(), 4);

        // bumped version: recomputed
        views.refresh(&state, 2);
        assert_eq!(views.sorted().len(), 1);
    }
}
