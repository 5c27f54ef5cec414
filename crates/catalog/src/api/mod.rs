//! Fake Store API client.
//!
//! Thin typed wrappers over the REST endpoints with per-operation timeouts,
//! bounded retry for transient read failures, and a `moka` read cache
//! (5-minute TTL). Write endpoints exist on the server but do not durably
//! persist anything, so every write here issues the HTTP call for realism
//! and then synthesizes the resulting domain value locally; each one
//! warn-logs that server persistence is not guaranteed.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use bazaar_core::{CartId, ProductId, UserId};

use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::types::{Cart, NewProduct, Product};

use cache::CacheValue;

/// Mint a locally unique id for a simulated write.
///
/// Unix-epoch milliseconds, matching what the server would never hand back.
pub(crate) fn mint_timestamp_id() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Fake Store REST API.
///
/// Cheap to clone; all clones share one connection pool and read cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    list_timeout: Duration,
    item_timeout: Duration,
    max_retries: u32,
    retry_backoff_base: Duration,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                list_timeout: config.list_timeout,
                item_timeout: config.item_timeout,
                max_retries: config.max_retries,
                retry_backoff_base: config.retry_backoff_base,
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::Validation(format!("malformed URL for {path}: {e}")))
    }

    /// Issue a single GET and decode the JSON body.
    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();

        // Body as text first for better error diagnostics
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                %url,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// GET with bounded retry: transient failures (timeout, connectivity,
    /// 5xx) are retried up to the configured budget with a linearly growing
    /// delay; terminal failures return immediately.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &Url,
        timeout: Duration,
        retries: u32,
    ) -> Result<T, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match self.get_once::<T>(url, timeout).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < retries => {
                    attempt += 1;
                    let delay = self.inner.retry_backoff_base * attempt;
                    debug!(
                        %url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Transient failure, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fire a write request for realism. The outcome never fails the
    /// simulated write; failures are warn-logged and swallowed.
    async fn send_write<B: Serialize>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: Option<&B>,
    ) {
        let mut request = self
            .inner
            .client
            .request(method.clone(), url.clone())
            .timeout(self.inner.item_timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        match request.send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(
                %url,
                status = response.status().as_u16(),
                "Simulated {method} returned non-success; continuing with local result"
            ),
            Err(err) => warn!(
                %url,
                "Simulated {method} failed on the wire; continuing with local result: {err}"
            ),
        }
    }

    // =========================================================================
    // Product Reads
    // =========================================================================

    /// Get the full product listing, optionally bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after the retry budget.
    #[instrument(skip(self))]
    pub async fn get_products(&self, limit: Option<u32>) -> Result<Vec<Product>, ApiError> {
        let cache_key = format!("products:{}", limit.map_or_else(String::new, |l| l.to_string()));

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint("products")?;
        if let Some(limit) = limit {
            if limit == 0 {
                return Err(ApiError::Validation(
                    "limit must be a positive integer".to_string(),
                ));
            }
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
        }

        let products: Vec<Product> = self
            .get_with_retry(&url, self.inner.list_timeout, self.inner.max_retries)
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Rejects non-positive ids before any network I/O; returns
    /// `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if id.as_i64() <= 0 {
            return Err(ApiError::Validation(format!("invalid product id: {id}")));
        }

        let cache_key = format!("product:{id}");
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let product: Product = self
            .get_with_retry(&url, self.inner.item_timeout, self.inner.max_retries)
            .await
            .map_err(|err| match err {
                ApiError::NotFound(_) => ApiError::NotFound(format!("Product not found: {id}")),
                other => other,
            })?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the products belonging to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; this read is not retried.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, ApiError> {
        let cache_key = format!("products:category:{category}");
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let url = self.endpoint(&format!("products/category/{category}"))?;
        let products: Vec<Product> = self.get_once(&url, self.inner.list_timeout).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get the list of category labels.
    ///
    /// Non-critical read: a terminal failure degrades to an empty list so
    /// the view stays populated, and is warn-logged rather than surfaced.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Vec<String> {
        let cache_key = "categories".to_string();
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return categories;
        }

        let url = match self.endpoint("products/categories") {
            Ok(url) => url,
            Err(err) => {
                warn!("Category listing unavailable, falling back to empty: {err}");
                return Vec::new();
            }
        };

        match self
            .get_with_retry::<Vec<String>>(&url, self.inner.item_timeout, self.inner.max_retries)
            .await
        {
            Ok(categories) => {
                self.inner
                    .cache
                    .insert(cache_key, CacheValue::Categories(categories.clone()))
                    .await;
                categories
            }
            Err(err) => {
                warn!("Failed to load categories, falling back to empty: {err}");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Cart Reads (not cached - mutable state)
    // =========================================================================

    /// Get every cart the API knows about.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_carts(&self) -> Result<Vec<Cart>, ApiError> {
        let url = self.endpoint("carts")?;
        self.get_once(&url, self.inner.list_timeout).await
    }

    /// Get the cart belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the user has no cart.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart_for_user(&self, user_id: UserId) -> Result<Cart, ApiError> {
        if user_id.as_i64() <= 0 {
            return Err(ApiError::Validation(format!("invalid user id: {user_id}")));
        }
        let url = self.endpoint(&format!("carts/user/{user_id}"))?;
        self.get_once(&url, self.inner.item_timeout)
            .await
            .map_err(|err| match err {
                ApiError::NotFound(_) => {
                    ApiError::NotFound(format!("Cart not found for user: {user_id}"))
                }
                other => other,
            })
    }

    // =========================================================================
    // Simulated Writes
    // =========================================================================
    //
    // The backing service accepts these requests and discards them. The
    // domain value handed back to the state layer is synthesized here, never
    // taken from the response body.

    /// Create a product. The returned product carries a locally minted
    /// timestamp id and a zeroed rating, not server data.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for incomplete input; the network
    /// call itself cannot fail the operation.
    #[instrument(skip(self, new_product), fields(title = %new_product.title))]
    pub async fn add_product(&self, new_product: NewProduct) -> Result<Product, ApiError> {
        new_product.validate()?;

        warn!("Fake Store API does not persist product creation; using locally synthesized product");

        let url = self.endpoint("products")?;
        self.send_write(reqwest::Method::POST, url, Some(&new_product))
            .await;

        self.invalidate_product_reads().await;
        Ok(new_product.into_product(ProductId::new(mint_timestamp_id())))
    }

    /// Update a product. The merged product passed in is what the state
    /// layer keeps; the PUT is issued for realism only.
    ///
    /// # Errors
    ///
    /// Rejects non-positive ids before any network I/O.
    #[instrument(skip(self, merged), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        merged: Product,
    ) -> Result<Product, ApiError> {
        if id.as_i64() <= 0 {
            return Err(ApiError::Validation(format!("invalid product id: {id}")));
        }

        warn!("Fake Store API does not persist product updates; using locally merged product");

        let url = self.endpoint(&format!("products/{id}"))?;
        self.send_write(reqwest::Method::PUT, url, Some(&merged))
            .await;

        self.inner.cache.invalidate(&format!("product:{id}")).await;
        self.invalidate_product_reads().await;
        Ok(merged)
    }

    /// Delete a product. Always succeeds locally.
    ///
    /// # Errors
    ///
    /// Rejects non-positive ids before any network I/O.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<ProductId, ApiError> {
        if id.as_i64() <= 0 {
            return Err(ApiError::Validation(format!("invalid product id: {id}")));
        }

        warn!("Fake Store API does not persist product deletion; removing locally only");

        let url = self.endpoint(&format!("products/{id}"))?;
        self.send_write::<()>(reqwest::Method::DELETE, url, None)
            .await;

        self.inner.cache.invalidate(&format!("product:{id}")).await;
        self.invalidate_product_reads().await;
        Ok(id)
    }

    /// Persist a cart, for realism: POST for a freshly created cart, PUT
    /// for an existing one. The cart handed in is the canonical result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when the URL cannot be built.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    pub async fn save_cart(&self, cart: &Cart, freshly_created: bool) -> Result<Cart, ApiError> {
        warn!("Fake Store API does not persist cart writes; using locally maintained cart");

        if freshly_created {
            let url = self.endpoint("carts")?;
            self.send_write(reqwest::Method::POST, url, Some(cart)).await;
        } else {
            let url = self.endpoint(&format!("carts/{}", cart.id))?;
            self.send_write(reqwest::Method::PUT, url, Some(cart)).await;
        }
        Ok(cart.clone())
    }

    /// Delete a cart. Degrades to `false` on any failure.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_cart(&self, id: CartId) -> bool {
        let url = match self.endpoint(&format!("carts/{id}")) {
            Ok(url) => url,
            Err(err) => {
                warn!("Cart deletion skipped: {err}");
                return false;
            }
        };
        let result = self
            .inner
            .client
            .delete(url)
            .timeout(self.inner.item_timeout)
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!("Cart deletion failed: {err}");
                false
            }
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop cached product listings and category labels.
    async fn invalidate_product_reads(&self) {
        // Listing keys are parameterized; clearing everything is simpler
        // than tracking them, and single-product entries are re-fetched
        // cheaply.
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
