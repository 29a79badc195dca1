//! Catalog records returned by the products and stock endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price in the store currency. Serialized as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

impl Product {
    /// Unit price tagged with the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::BRL)
    }
}

/// Available quantity for a product.
///
/// The stock endpoint is authoritative: a cart line may never hold more
/// than `amount` units. Zero or negative means nothing is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit within the available stock.
    #[must_use]
    pub const fn allows(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
