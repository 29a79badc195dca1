//! `RocketShoes` cart library.
//!
//! Client-side shopping cart state for the `RocketShoes` storefront: add,
//! remove and update line items, validate amounts against the catalog's stock
//! endpoint, and persist the cart to a local key-value store.
//!
//! # Modules
//!
//! - [`store`] - The [`CartStore`] state container and its operations
//! - [`catalog`] - Stock and product lookups, and the HTTP [`CatalogClient`]
//! - [`storage`] - Snapshot persistence over pluggable key-value backends
//! - [`notify`] - User-facing notices for rejected and failed operations
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, ProductLookup, StockLookup};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use error::{CartError, CartOperation};
pub use notify::{CartNotice, ChannelNotifier, Notifier, TracingNotifier};
pub use storage::{
    CART_STORAGE_KEY, CartStorage, FileStore, JsonCartStorage, KeyValueStore, MemoryStore,
    StorageError,
};
pub use store::{CartStore, FileCartStore, UpdateProductAmount};
