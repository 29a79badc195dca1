//! Cart persistence.
//!
//! Two layers keep the cart logic independent of where bytes end up:
//!
//! - [`KeyValueStore`] - synchronous string key-value backend
//!   ([`MemoryStore`], [`FileStore`])
//! - [`CartStorage`] - save/load of a whole [`Cart`] snapshot;
//!   [`JsonCartStorage`] serializes it as JSON under [`CART_STORAGE_KEY`]

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use rocketshoes_core::Cart;
use thiserror::Error;

/// Key the cart snapshot is stored under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Save and load whole cart snapshots.
pub trait CartStorage: Send + Sync {
    /// Load the last saved cart, or an empty cart if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the snapshot is corrupt.
    fn load(&self) -> Result<Cart, StorageError>;

    /// Replace the saved cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    fn save(&self, cart: &Cart) -> Result<(), StorageError>;
}

/// Cart snapshots as JSON arrays in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct JsonCartStorage<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> JsonCartStorage<K> {
    /// Store snapshots under [`CART_STORAGE_KEY`].
    pub fn new(store: K) -> Self {
        Self::with_key(store, CART_STORAGE_KEY)
    }

    /// Store snapshots under a custom key.
    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The underlying key-value store.
    pub const fn store(&self) -> &K {
        &self.store
    }
}

impl<K: KeyValueStore> CartStorage for JsonCartStorage<K> {
    fn load(&self) -> Result<Cart, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Cart::new());
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(&self.key, &raw)
    }
}
