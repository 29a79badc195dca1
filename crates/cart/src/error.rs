//! Cart operation errors.
//!
//! These never leave the store. Each operation runs as a fallible function
//! returning `Result<_, CartError>`, and the store converts the error into a
//! [`CartNotice`] for the shopper and a `tracing` event for operators.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::notify::CartNotice;
use crate::storage::StorageError;

/// Why a cart operation did not complete.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock or product lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Snapshot could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Requested amount is above the available stock.
    #[error("Product {product_id}: requested {requested}, only {available} available")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Amount cannot be stored on a cart line.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
}

/// Cart operation, used to pick the notice for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
    Clear,
}

impl CartOperation {
    /// Generic failure notice for this operation.
    #[must_use]
    pub const fn failure_notice(self) -> CartNotice {
        match self {
            Self::Add => CartNotice::AddFailed,
            Self::Remove => CartNotice::RemoveFailed,
            Self::Update => CartNotice::UpdateFailed,
            Self::Clear => CartNotice::ClearFailed,
        }
    }
}

impl CartError {
    /// Notice shown to the shopper when `operation` fails with this error.
    ///
    /// Stock rejections get their own message; everything else maps to the
    /// operation's generic failure notice.
    #[must_use]
    pub const fn notice(&self, operation: CartOperation) -> CartNotice {
        match self {
            Self::StockExceeded { .. } => CartNotice::StockExceeded,
            _ => operation.failure_notice(),
        }
    }

    /// Whether this is a business-rule rejection rather than a fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::StockExceeded { .. } | Self::NotInCart(_))
    }
}
