//! HTTP client for the catalog API.

use std::sync::Arc;

use moka::future::Cache;
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{CatalogError, ProductLookup, StockLookup};
use crate::config::CatalogConfig;

/// Maximum number of cached product entries.
const CACHE_CAPACITY: u64 = 1000;

/// Body of `GET /stock/{id}`. Only the amount is trusted; the id comes from
/// the request.
#[derive(Debug, Deserialize)]
struct StockResponse {
    amount: i64,
}

/// Client for the catalog API.
///
/// Cheap to clone. Product records are cached for the configured TTL; stock
/// levels are fetched fresh on every call.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        // A zero TTL disables caching entirely
        let cache = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Build the absolute URL for an endpoint path.
    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.endpoint(path)?;

        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown status")
                        .to_string()
                } else {
                    body.chars().take(200).collect()
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e.to_string())
        })
    }

    /// Fetch the available quantity for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not a stock record.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let response: StockResponse = self.get_json(&format!("stock/{id}")).await?;
        debug!(amount = response.amount, "Fetched stock");
        Ok(Stock {
            id,
            amount: response.amount,
        })
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);

        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Product(product)) = cache.get(&key).await
        {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;

        if product.id != id {
            return Err(CatalogError::Parse(format!(
                "requested product {id} but received {}",
                product.id
            )));
        }

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// List every product in the catalog.
    ///
    /// Also warms the per-product cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.get_json("products").await?);
        debug!(count = products.len(), "Fetched product listing");

        if let Some(cache) = &self.inner.cache {
            for product in products.iter() {
                cache
                    .insert(
                        CacheKey::Product(product.id),
                        CacheValue::Product(Box::new(product.clone())),
                    )
                    .await;
            }
            cache
                .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
                .await;
        }

        Ok(products)
    }

    /// Drop every cached product record.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }
}

impl StockLookup for CatalogClient {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.get_stock(id).await
    }
}

impl ProductLookup for CatalogClient {
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_product(id).await
    }
}
