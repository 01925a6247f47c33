//! # Cart Module
//!
//! The shopping cart and its quantity rules.
//!
//! ## Quantity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(p)          new id → append qty 1   existing → +1 (max 10)   │
//! │  increase_quantity    +1, stops at 10          → AtMaximum              │
//! │  decrease_quantity    -1, stops at 1           → AtMinimum              │
//! │  set_quantity(q)      q ≤ 0 → remove   q > 10 → 10   else exactly q    │
//! │  remove_item          delete, no-op if absent                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation reports a [`QuantityOutcome`] so the caller can tell a
//! real change from a no-op without diffing the cart.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CartLineItem, Product};
use crate::validation::{validate_price_minor, ValidationResult};
use crate::{MAX_ITEM_QUANTITY, MIN_ITEM_QUANTITY};

// =============================================================================
// Quantity Outcome
// =============================================================================

/// What a cart mutation actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityOutcome {
    /// A new line item was appended with quantity 1.
    Added,
    /// The quantity is now exactly this value.
    Set(i64),
    /// The requested quantity was out of range and was clamped.
    Clamped { requested: i64, applied: i64 },
    /// The line item was removed.
    Removed,
    /// Already at the maximum; nothing changed.
    AtMaximum,
    /// Already at the minimum; nothing changed.
    AtMinimum,
    /// No line item with that id; nothing changed.
    NotInCart,
}

impl QuantityOutcome {
    /// True if the cart was modified.
    pub fn changed(&self) -> bool {
        !matches!(
            self,
            QuantityOutcome::AtMaximum | QuantityOutcome::AtMinimum | QuantityOutcome::NotInCart
        )
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An ordered list of line items with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from stored items, repairing anything out of range.
    ///
    /// Non-positive quantities are dropped, duplicate ids are merged into the
    /// first occurrence, and quantities are clamped to the maximum.
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut merged: Vec<CartLineItem> = Vec::new();

        for item in items {
            if item.quantity < MIN_ITEM_QUANTITY {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => merged.push(item),
            }
        }

        for item in &mut merged {
            item.quantity = item.quantity.min(MAX_ITEM_QUANTITY);
        }

        Self { items: merged }
    }

    #[inline]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Adds one unit of `product`.
    ///
    /// ## Errors
    /// A price outside `0..=MAX_UNIT_PRICE` is rejected; the cart is left
    /// unchanged.
    pub fn add_item(&mut self, product: &Product) -> ValidationResult<QuantityOutcome> {
        validate_price_minor(product.price.minor())?;

        if let Some(index) = self.position(&product.id) {
            return Ok(self.step(index, 1));
        }

        self.items.push(CartLineItem::new(
            product.id.clone(),
            product.name.clone(),
            product.price,
            MIN_ITEM_QUANTITY,
        ));
        Ok(QuantityOutcome::Added)
    }

    /// Removes the line item with `id`.
    pub fn remove_item(&mut self, id: &str) -> QuantityOutcome {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                QuantityOutcome::Removed
            }
            None => QuantityOutcome::NotInCart,
        }
    }

    /// Sets the quantity of `id`: `q ≤ 0` removes, `q > 10` clamps to 10.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> QuantityOutcome {
        let Some(index) = self.position(id) else {
            return QuantityOutcome::NotInCart;
        };

        if quantity < MIN_ITEM_QUANTITY {
            self.items.remove(index);
            return QuantityOutcome::Removed;
        }

        if quantity > MAX_ITEM_QUANTITY {
            self.items[index].quantity = MAX_ITEM_QUANTITY;
            return QuantityOutcome::Clamped {
                requested: quantity,
                applied: MAX_ITEM_QUANTITY,
            };
        }

        self.items[index].quantity = quantity;
        QuantityOutcome::Set(quantity)
    }

    pub fn increase_quantity(&mut self, id: &str) -> QuantityOutcome {
        match self.position(id) {
            Some(index) => self.step(index, 1),
            None => QuantityOutcome::NotInCart,
        }
    }

    /// Decrements by one. At quantity 1 this is a no-op; use
    /// [`Cart::remove_item`] to drop the line.
    pub fn decrease_quantity(&mut self, id: &str) -> QuantityOutcome {
        match self.position(id) {
            Some(index) => self.step(index, -1),
            None => QuantityOutcome::NotInCart,
        }
    }

    fn step(&mut self, index: usize, delta: i64) -> QuantityOutcome {
        let item = &mut self.items[index];
        let next = item.quantity + delta;

        if next > MAX_ITEM_QUANTITY {
            QuantityOutcome::AtMaximum
        } else if next < MIN_ITEM_QUANTITY {
            QuantityOutcome::AtMinimum
        } else {
            item.quantity = next;
            QuantityOutcome::Set(next)
        }
    }

    /// Σ unit_price × quantity. Zero for an empty cart.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Σ quantity, shown on the cart badge.
    pub fn total_item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Consumes the cart, returning its line items.
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Cart::from_items(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Product {
        Product::new("ring-1", "Silver ring", Money::from_major(100))
    }

    fn necklace() -> Product {
        Product::new("neck-1", "Pearl necklace", Money::from_minor(24950))
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_add_new_item() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(&ring()).unwrap(), QuantityOutcome::Added);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("ring-1").unwrap().quantity, 1);
    }

    #[test]
    fn test_add_existing_item_never_duplicates() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();
        assert_eq!(cart.add_item(&ring()).unwrap(), QuantityOutcome::Set(2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("ring-1").unwrap().quantity, 2);
    }

    #[test]
    fn test_add_at_cap_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();
        cart.set_quantity("ring-1", 10);

        assert_eq!(cart.add_item(&ring()).unwrap(), QuantityOutcome::AtMaximum);
        assert_eq!(cart.get("ring-1").unwrap().quantity, 10);
    }

    #[test]
    fn test_add_negative_price_rejected() {
        let mut cart = Cart::new();
        let bad = Product::new("x", "Broken", Money::from_minor(-1));
        assert!(cart.add_item(&bad).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_price_above_maximum_rejected() {
        let mut cart = Cart::new();
        let huge = Product::new("crown", "Crown", Money::from_minor(i64::MAX / 2 + 1));

        assert!(cart.add_item(&huge).is_err());
        assert!(cart.add_item(&huge).is_err());
        assert!(cart.is_empty());

        let priciest = Product::new("tiara", "Tiara", crate::MAX_UNIT_PRICE);
        assert_eq!(cart.add_item(&priciest).unwrap(), QuantityOutcome::Added);
    }

    #[test]
    fn test_set_quantity_rules() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();

        assert_eq!(cart.set_quantity("ring-1", 4), QuantityOutcome::Set(4));
        assert_eq!(cart.get("ring-1").unwrap().quantity, 4);

        assert_eq!(
            cart.set_quantity("ring-1", 25),
            QuantityOutcome::Clamped {
                requested: 25,
                applied: 10
            }
        );
        assert_eq!(cart.get("ring-1").unwrap().quantity, 10);

        assert_eq!(cart.set_quantity("ring-1", 0), QuantityOutcome::Removed);
        assert!(cart.is_empty());

        cart.add_item(&ring()).unwrap();
        assert_eq!(cart.set_quantity("ring-1", -3), QuantityOutcome::Removed);
        assert!(cart.is_empty());

        assert_eq!(cart.set_quantity("ring-1", 2), QuantityOutcome::NotInCart);
    }

    #[test]
    fn test_increase_and_decrease_bounds() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();

        assert_eq!(cart.decrease_quantity("ring-1"), QuantityOutcome::AtMinimum);
        assert_eq!(cart.get("ring-1").unwrap().quantity, 1);

        for expected in 2..=10 {
            assert_eq!(cart.increase_quantity("ring-1"), QuantityOutcome::Set(expected));
        }
        assert_eq!(cart.increase_quantity("ring-1"), QuantityOutcome::AtMaximum);
        assert!(!QuantityOutcome::AtMaximum.changed());

        assert_eq!(cart.decrease_quantity("ring-1"), QuantityOutcome::Set(9));
        assert_eq!(cart.increase_quantity("missing"), QuantityOutcome::NotInCart);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();
        assert_eq!(cart.remove_item("missing"), QuantityOutcome::NotInCart);
        assert_eq!(cart.remove_item("ring-1"), QuantityOutcome::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal_and_count() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();
        cart.add_item(&ring()).unwrap();
        cart.add_item(&necklace()).unwrap();

        // 2 × 100.00 + 249.50
        assert_eq!(cart.subtotal().minor(), 44950);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_subtotal_is_order_invariant() {
        let mut forward = Cart::new();
        forward.add_item(&ring()).unwrap();
        forward.add_item(&necklace()).unwrap();
        forward.set_quantity("neck-1", 3);

        let mut reverse = Cart::new();
        reverse.add_item(&necklace()).unwrap();
        reverse.set_quantity("neck-1", 3);
        reverse.add_item(&ring()).unwrap();

        assert_eq!(forward.subtotal(), reverse.subtotal());
    }

    #[test]
    fn test_from_items_sanitizes() {
        let cart = Cart::from_items(vec![
            CartLineItem::new("a", "A", Money::from_major(10), 3),
            CartLineItem::new("b", "B", Money::from_major(5), 0),
            CartLineItem::new("a", "A", Money::from_major(10), 9),
            CartLineItem::new("c", "C", Money::from_major(1), 42),
            CartLineItem::new("d", "D", Money::from_major(1), -2),
        ]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("a").unwrap().quantity, 10);
        assert_eq!(cart.get("c").unwrap().quantity, 10);
        assert!(cart.get("b").is_none());
        assert!(cart.get("d").is_none());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&ring()).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }
}
