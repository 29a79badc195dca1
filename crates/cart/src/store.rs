//! The cart store.
//!
//! [`CartStore`] owns the shopper's [`Cart`] for the length of a session. It
//! exposes three mutating operations (add, remove, update amount), validates
//! amounts against the stock lookup, persists a full snapshot after every
//! successful mutation, and reports rejections and failures through a
//! [`Notifier`].
//!
//! # Consistency
//!
//! - Mutations run one at a time. Each operation holds the store's gate for
//!   its whole duration, including the stock lookup, so two concurrent adds
//!   of the same product cannot both read the same starting amount.
//! - Every operation works on a copy of the cart. The copy is written to
//!   storage first and only then published, so readers never observe a cart
//!   that was not persisted, and a failed operation leaves no trace.
//!
//! # Example
//!
//! ```rust,ignore
//! let (notifier, mut notices) = ChannelNotifier::new();
//! let store = CartStore::from_config(&config, notifier)?;
//!
//! store.add_product(ProductId::new(1)).await;
//! store
//!     .update_product_amount(UpdateProductAmount { product_id: ProductId::new(1), amount: 3 })
//!     .await;
//!
//! while let Ok(notice) = notices.try_recv() {
//!     eprintln!("{notice}");
//! }
//! ```

use std::sync::Arc;

use rocketshoes_core::{Cart, CartItem, ProductId};
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument};

use crate::catalog::{CatalogClient, CatalogError, ProductLookup, StockLookup};
use crate::config::CartConfig;
use crate::error::{CartError, CartOperation};
use crate::notify::Notifier;
use crate::storage::{CartStorage, FileStore, JsonCartStorage, StorageError};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Desired amount. Zero or negative requests are ignored.
    pub amount: i64,
}

/// Cart store backed by the HTTP catalog and a file on disk.
pub type FileCartStore<N> = CartStore<CatalogClient, JsonCartStorage<FileStore>, N>;

/// Session cart state shared by every consumer holding a handle.
///
/// Cheap to clone; clones share the same cart.
pub struct CartStore<C, S, N> {
    inner: Arc<CartStoreInner<C, S, N>>,
}

struct CartStoreInner<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    state: watch::Sender<Cart>,
    gate: Mutex<()>,
}

impl<C, S, N> Clone for CartStore<C, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Notifier> FileCartStore<N> {
    /// Build a store from configuration: HTTP catalog, file-backed storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &CartConfig, notifier: N) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let storage = JsonCartStorage::new(FileStore::new(&config.storage_path));
        Ok(Self::new(catalog, storage, notifier))
    }
}

impl<C, S, N> CartStore<C, S, N>
where
    C: StockLookup + ProductLookup,
    S: CartStorage,
    N: Notifier,
{
    /// Create a store, starting from the persisted snapshot if there is one.
    ///
    /// A snapshot that cannot be read is logged and replaced by an empty
    /// cart; it is overwritten by the next successful mutation.
    pub fn new(catalog: C, storage: S, notifier: N) -> Self {
        let cart = storage.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load persisted cart, starting empty");
            Cart::new()
        });
        debug!(items = cart.len(), "Cart store initialized");

        Self {
            inner: Arc::new(CartStoreInner {
                catalog,
                storage,
                notifier,
                state: watch::Sender::new(cart),
                gate: Mutex::new(()),
            }),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// The stock and product lookup collaborator.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.inner.catalog
    }

    /// The persistence collaborator.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Add one unit of a product.
    ///
    /// New products are fetched from the catalog and appended with amount 1;
    /// products already in the cart are incremented. Rejected if the new
    /// amount would exceed the available stock.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let _gate = self.inner.gate.lock().await;
        let result = self.try_add(product_id).await;
        self.finish(CartOperation::Add, result);
    }

    /// Remove a product from the cart entirely.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let _gate = self.inner.gate.lock().await;
        let result = self.try_remove(product_id);
        self.finish(CartOperation::Remove, result);
    }

    /// Set the amount of a product already in the cart.
    ///
    /// Amounts of zero or less are ignored without any notice; removing a
    /// product goes through [`Self::remove_product`].
    #[instrument(skip(self, request), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        if request.amount <= 0 {
            debug!("Ignoring non-positive amount");
            return;
        }

        let _gate = self.inner.gate.lock().await;
        let result = self.try_update(request).await;
        self.finish(CartOperation::Update, result);
    }

    /// Remove every product from the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let _gate = self.inner.gate.lock().await;
        let mut cart = self.cart();
        cart.clear();
        self.finish(CartOperation::Clear, Ok(cart));
    }

    /// Replace the in-memory cart with the persisted snapshot.
    ///
    /// Picks up writes made through another handle on the same storage, such
    /// as a second process sharing the storage file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be read; the in-memory
    /// cart is left unchanged.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<(), StorageError> {
        let _gate = self.inner.gate.lock().await;
        let cart = self.inner.storage.load()?;
        debug!(items = cart.len(), "Reloaded cart from storage");
        self.inner.state.send_replace(cart);
        Ok(())
    }

    // =========================================================================
    // Operation bodies
    // =========================================================================

    async fn try_add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.cart();
        let stock = self.inner.catalog.stock(product_id).await?;

        let current = cart.amount_of(product_id);
        let requested = i64::from(current) + 1;
        if !stock.allows(requested) {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        if current > 0 {
            let next = current
                .checked_add(1)
                .ok_or(CartError::InvalidAmount(requested))?;
            cart.set_amount(product_id, next);
        } else {
            let product = self.inner.catalog.product(product_id).await?;
            cart.insert(CartItem::from_product(product, 1));
        }

        Ok(cart)
    }

    fn try_remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.cart();
        cart.remove(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        Ok(cart)
    }

    async fn try_update(&self, request: UpdateProductAmount) -> Result<Cart, CartError> {
        let UpdateProductAmount { product_id, amount } = request;

        let stock = self.inner.catalog.stock(product_id).await?;
        if !stock.allows(amount) {
            return Err(CartError::StockExceeded {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;
        let mut cart = self.cart();
        if !cart.set_amount(product_id, amount) {
            return Err(CartError::NotInCart(product_id));
        }

        Ok(cart)
    }

    // =========================================================================
    // Commit and failure boundary
    // =========================================================================

    /// Persist then publish a new cart.
    fn commit(&self, cart: Cart) -> Result<(), CartError> {
        self.inner.storage.save(&cart)?;
        self.inner.state.send_replace(cart);
        Ok(())
    }

    /// Commit a successful result, or turn the error into a notice.
    fn finish(&self, operation: CartOperation, result: Result<Cart, CartError>) {
        match result.and_then(|cart| self.commit(cart)) {
            Ok(()) => {
                let cart = self.inner.state.borrow();
                info!(
                    operation = ?operation,
                    items = cart.len(),
                    units = cart.item_count(),
                    "Cart updated"
                );
            }
            Err(e) => {
                if e.is_rejection() {
                    tracing::warn!(operation = ?operation, error = %e, "Cart operation rejected");
                } else {
                    tracing::error!(operation = ?operation, error = %e, "Cart operation failed");
                }
                self.inner.notifier.notify(e.notice(operation));
            }
        }
    }
}
