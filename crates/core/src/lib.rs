//! `RocketShoes` Core - Shared types library.
//!
//! This crate provides the types shared by the `RocketShoes` components:
//! - `cart` - Cart store, catalog client and persistence
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! backends. Cart invariants (unique ids, positive amounts) live here so every
//! consumer gets them for free.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
