//! The client-held shopping cart.
//!
//! The storefront keeps the cart in browser local storage and never persists
//! it server-side. This module is the single definition of how a cart merges
//! new items so that the API's add-to-cart stock check applies exactly the
//! rules the client does.
//!
//! A cart line is identified by `(product_id, color_name)`. An absent color
//! and an empty color name are the same key.
//!
//! The stock figure passed to [`Cart::add`] is a point-in-time read. Nothing
//! here reserves stock: two carts can both pass the same check.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Errors returned when a cart mutation is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Not enough stock to cover what is already in the cart plus the request.
    #[error("only {available} in stock, {in_cart} already in cart")]
    InsufficientStock {
        /// Units available at the time of the check.
        available: u32,
        /// Units of this line already in the cart.
        in_cart: u32,
    },

    /// No line matches the key.
    #[error("item is not in the cart")]
    NotInCart,
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub product_id: ProductId,
    pub color_name: Option<String>,
}

impl CartKey {
    /// Build a key, folding an empty color name into "no color".
    #[must_use]
    pub fn new(product_id: ProductId, color_name: Option<&str>) -> Self {
        Self {
            product_id,
            color_name: normalize_color(color_name).map(str::to_owned),
        }
    }

    fn matches(&self, item: &CartItem) -> bool {
        self.product_id == item.product_id
            && self.color_name.as_deref() == normalize_color(item.color_name.as_deref())
    }
}

/// One line of the cart, in the shape the browser stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_image: Option<String>,
}

impl CartItem {
    /// The key this line merges under.
    #[must_use]
    pub fn key(&self) -> CartKey {
        CartKey::new(self.product_id, self.color_name.as_deref())
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An ordered list of cart lines.
///
/// Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from stored lines, merging any duplicate keys.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            let key = item.key();
            match cart.items.iter_mut().find(|line| key.matches(line)) {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity already held under `key` (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, key: &CartKey) -> u32 {
        self.items
            .iter()
            .find(|line| key.matches(line))
            .map_or(0, |line| line.quantity)
    }

    /// Add `item` if stock allows, incrementing an existing line with the
    /// same key or appending a new one.
    ///
    /// Returns the line's quantity after the merge.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::InsufficientStock`] when the cart would hold more than
    /// `available_stock`. The cart is unchanged on error.
    pub fn add(&mut self, item: CartItem, available_stock: u32) -> Result<u32, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let key = item.key();
        let in_cart = self.quantity_of(&key);
        let wanted = in_cart.saturating_add(item.quantity);
        if wanted > available_stock {
            return Err(CartError::InsufficientStock {
                available: available_stock,
                in_cart,
            });
        }

        if let Some(line) = self.items.iter_mut().find(|line| key.matches(line)) {
            line.quantity = wanted;
            // Keep the latest display data the client sent.
            line.name = item.name;
            line.price = item.price;
            if item.color_image.is_some() {
                line.color_image = item.color_image;
            }
        } else {
            self.items.push(item);
        }
        Ok(wanted)
    }

    /// Set the quantity of a line; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when no line matches `key`.
    pub fn update_quantity(&mut self, key: &CartKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(key).map(|_| ());
        }
        let line = self
            .items
            .iter_mut()
            .find(|line| key.matches(line))
            .ok_or(CartError::NotInCart)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when no line matches `key`.
    pub fn remove(&mut self, key: &CartKey) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| key.matches(line))
            .ok_or(CartError::NotInCart)?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

fn normalize_color(color: Option<&str>) -> Option<&str> {
    color.map(str::trim).filter(|c| !c.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(product: i32, color: Option<&str>, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(product),
            name: format!("Product {product}"),
            price: Decimal::new(1250, 2),
            quantity,
            color_name: color.map(str::to_owned),
            color_image: None,
        }
    }

    #[test]
    fn test_add_appends_new_line() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(item(1, None, 2), 5), Ok(2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_same_key_increments_single_line() {
        let mut cart = Cart::new();
        cart.add(item(1, Some("Red"), 1), 5).unwrap();
        assert_eq!(cart.add(item(1, Some("Red"), 2), 5), Ok(3));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(&CartKey::new(ProductId::new(1), Some("Red"))), 3);
    }

    #[test]
    fn test_colors_are_separate_lines() {
        let mut cart = Cart::new();
        cart.add(item(1, Some("Red"), 1), 5).unwrap();
        cart.add(item(1, Some("Blue"), 1), 5).unwrap();
        cart.add(item(1, None, 1), 5).unwrap();
        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn test_empty_color_is_no_color() {
        let mut cart = Cart::new();
        cart.add(item(1, Some(""), 1), 5).unwrap();
        cart.add(item(1, None, 1), 5).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(&CartKey::new(ProductId::new(1), Some("  "))), 2);
    }

    #[test]
    fn test_add_past_stock_is_rejected_and_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(item(1, None, 3), 4).unwrap();
        let before = cart.clone();

        let err = cart.add(item(1, None, 2), 4).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                available: 4,
                in_cart: 3
            }
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_exactly_available_is_allowed() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(item(1, None, 4), 4), Ok(4));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(item(1, None, 0), 4), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::new();
        cart.add(item(1, None, 1), 10).unwrap();
        cart.add(item(2, None, 1), 10).unwrap();
        let key = CartKey::new(ProductId::new(1), None);

        cart.update_quantity(&key, 6).unwrap();
        assert_eq!(cart.quantity_of(&key), 6);

        cart.update_quantity(&key, 0).unwrap();
        assert_eq!(cart.quantity_of(&key), 0);
        assert_eq!(cart.remove(&key), Err(CartError::NotInCart));
        assert_eq!(cart.items().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_uses_decimal_arithmetic() {
        let mut cart = Cart::new();
        cart.add(item(1, None, 3), 10).unwrap();
        cart.add(item(2, Some("Red"), 1), 10).unwrap();
        assert_eq!(cart.total(), Decimal::new(5000, 2));
    }

    #[test]
    fn test_from_items_merges_duplicates_and_drops_empty_lines() {
        let cart = Cart::from_items(vec![
            item(1, Some("Red"), 1),
            item(2, None, 0),
            item(1, Some("Red"), 2),
        ]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_local_storage_shape() {
        let json = r#"[{"productId":7,"name":"Mug","price":"4.50","quantity":2,"colorName":"White"}]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items()[0].product_id, ProductId::new(7));
        assert_eq!(cart.items()[0].color_name.as_deref(), Some("White"));

        let back = serde_json::to_value(&cart).unwrap();
        assert_eq!(back[0]["price"], "4.50");
        assert!(back[0].get("colorImage").is_none());
    }
}
