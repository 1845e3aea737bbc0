use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OrderId, ProductId, UserId};
use crate::money::Money;

/// Flat shipping fee charged on any non-empty order.
pub const FLAT_SHIPPING: Money = Money::from_cents(599);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("price cannot be negative")]
    NegativePrice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category: String,
    pub inventory: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(u64::from(self.quantity))
    }
}

/// Client-side shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    shipping_fee: Option<Money>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a shipping fee other than `FLAT_SHIPPING`.
    #[must_use]
    pub fn with_shipping_fee(mut self, fee: Money) -> Self {
        self.shipping_fee = Some(fee);
        self
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for zero and
    /// `CartError::NegativePrice` for a negative product price.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if product.price.is_negative() {
            return Err(CartError::NegativePrice);
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }
        Ok(())
    }

    /// Set the quantity of a line. Quantities below one are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product has no line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        if quantity >= 1 {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product has no line.
    pub fn remove(&mut self, product_id: ProductId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn shipping(&self) -> Money {
        if self.subtotal().is_positive() {
            self.shipping_fee.unwrap_or(FLAT_SHIPPING)
        } else {
            Money::ZERO
        }
    }

    #[must_use]
    pub fn total(&self) -> Money {
        self.subtotal() + self.shipping()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub item_count: u32,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub checkout_session: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            description: None,
            price: Money::from_cents(cents),
            category: "crystals".into(),
            inventory: 10,
        }
    }

    #[test]
    fn add_merges_quantities() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1999), 1).unwrap();
        cart.add(&product(1, 1999), 2).unwrap();
        cart.add(&product(2, 500), 1).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), Money::from_cents(1999 * 3 + 500));
        assert_eq!(cart.total(), Money::from_cents(1999 * 3 + 500 + 599));
    }

    #[test]
    fn empty_cart_has_no_shipping() {
        let cart = Cart::new();
        assert_eq!(cart.shipping(), Money::ZERO);
        assert_eq!(cart.total(), Money::ZERO);
    }

    #[test]
    fn set_quantity_ignores_zero() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100), 3).unwrap();
        cart.set_quantity(ProductId::new(1), 0).unwrap();
        assert_eq!(cart.item_count(), 3);
        cart.set_quantity(ProductId::new(1), 1).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(
            cart.set_quantity(ProductId::new(9), 1).unwrap_err(),
            CartError::NotInCart(ProductId::new(9))
        );
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new().with_shipping_fee(Money::from_units(2));
        cart.add(&product(1, 100), 1).unwrap();
        cart.add(&product(2, 100), 1).unwrap();
        assert_eq!(cart.shipping(), Money::from_units(2));

        let removed = cart.remove(ProductId::new(1)).unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_add_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(&product(1, 100), 0).unwrap_err(),
            CartError::InvalidQuantity
        );
    }
}
