//! Cart line items and the cart sequence.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by product id, where
//! every item holds at least one unit. The mutation methods keep both
//! invariants, and deserialization goes through [`Cart::from_items`] to
//! restore them.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// A product in the cart together with the chosen quantity.
///
/// Serializes as the catalog product record with an extra `amount` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub amount: u32,
}

impl CartItem {
    /// Build a cart line from a catalog product.
    #[must_use]
    pub fn from_product(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Unit price tagged with the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::BRL)
    }

    /// Unit price multiplied by the amount.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::new(self.price * Decimal::from(self.amount), CurrencyCode::BRL)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw items, restoring the cart invariants.
    ///
    /// Items with a zero amount are dropped, and when an id appears more than
    /// once only its first occurrence is kept. Order is otherwise preserved.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| item.amount > 0 && seen.insert(item.id))
            .collect();
        Self { items }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Index of the item for a product.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    /// Amount held for a product, or 0 when it is not in the cart.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Append a new item.
    ///
    /// Returns `false` and leaves the cart untouched if the product is
    /// already present or the item has a zero amount.
    pub fn insert(&mut self, item: CartItem) -> bool {
        if item.amount == 0 || self.contains(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Set the amount for a product already in the cart.
    ///
    /// An amount of zero removes the item. Returns `false` if the product is
    /// not in the cart.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if amount == 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.amount = amount;
        }
        true
    }

    /// Remove the item for a product, returning it if it was present.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        self.position(id).map(|index| self.items.remove(index))
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let amount = self
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.amount))
            .sum();
        Price::new(amount, CurrencyCode::BRL)
    }

    /// Amount held per product, for badges on a product listing.
    #[must_use]
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.id, item.amount))
            .collect()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Decimal::new(10_000, 2),
            image: format!("https://cdn.example.com/{id}.jpg"),
            amount,
        }
    }

    #[test]
    fn test_from_items_drops_zero_amounts_and_duplicates() {
        let cart = Cart::from_items([item(1, 2), item(2, 0), item(1, 5), item(3, 1)]);
        let ids: Vec<i32> = cart.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut cart = Cart::new();
        assert!(cart.insert(item(1, 1)));
        assert!(!cart.insert(item(1, 3)));
        assert!(!cart.insert(item(2, 0)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_set_amount_zero_removes() {
        let mut cart = Cart::from_items([item(1, 2), item(2, 1)]);
        assert!(cart.set_amount(ProductId::new(1), 0));
        assert!(!cart.contains(ProductId::new(1)));
        assert!(!cart.set_amount(ProductId::new(9), 4));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut cart = Cart::from_items([item(1, 1), item(2, 1), item(3, 4)]);
        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.id, ProductId::new(2));
        assert_eq!(cart.items(), &[item(1, 1), item(3, 4)]);
        assert!(cart.remove(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items([item(1, 2), item(2, 3)]);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal().display(), "R$ 500,00");
        assert_eq!(cart.items().get(1).unwrap().line_total().display(), "R$ 300,00");
        assert_eq!(cart.amounts().get(&ProductId::new(2)), Some(&3));
    }

    #[test]
    fn test_snapshot_is_bare_array() {
        let cart = Cart::from_items([item(1, 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["amount"], 2);
        assert_eq!(json[0]["price"], 100.0);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_restores_invariants() {
        let json = serde_json::to_value([item(4, 1), item(5, 0), item(4, 3)]).unwrap();
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.items(), &[item(4, 1)]);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::from_items([item(1, 1), item(2, 2)]);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }
}
