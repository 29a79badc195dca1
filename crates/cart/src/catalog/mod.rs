//! Product and stock lookups against the `RocketShoes` catalog API.
//!
//! # Architecture
//!
//! - [`StockLookup`] and [`ProductLookup`] are the seams the cart store calls
//! - [`CatalogClient`] implements both over HTTP with `reqwest`
//! - Product metadata is cached via `moka`; stock never is
//!
//! # Endpoints
//!
//! - `GET /stock/{id}` - `{ "id": 1, "amount": 3 }`
//! - `GET /products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//! - `GET /products` - array of products
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::catalog::{CatalogClient, StockLookup};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;

pub use client::CatalogClient;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    /// Whether the API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Source of authoritative stock levels.
pub trait StockLookup: Send + Sync {
    /// Fetch the available quantity for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;
}

/// Source of product metadata used to build new cart lines.
pub trait ProductLookup: Send + Sync {
    /// Fetch the catalog record for a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;
}
