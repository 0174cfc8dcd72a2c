//! Cart aggregate.
//!
//! Canonical mutation semantics for a customer's cart. The Postgres adapter
//! reproduces these semantics with single-statement atomic writes; the
//! in-memory adapter delegates to this type directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::OwnerId;
use crate::error::Error;

/// Upper bound on a unit price, in paise (₹1 crore). Together with
/// [`MAX_QUANTITY`] this keeps every line total, and any realistic cart
/// subtotal, comfortably inside `i64` so pricing arithmetic cannot overflow.
pub const MAX_UNIT_PRICE_PAISE: i64 = 1_000_000_000;

/// Upper bound on a single line's quantity.
pub const MAX_QUANTITY: u32 = 10_000;

/// One product entry in a cart (or, snapshotted, in an order). Product data
/// is denormalized at add time; the catalog is a separate system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    /// Paise per unit.
    pub unit_price: i64,
    pub quantity: u32,
    pub image_url: String,
}

impl LineItem {
    /// Boundary validation for incoming items. Quantity and price rules live
    /// here so every entry path enforces them identically.
    pub fn validate(&self) -> Result<(), Error> {
        if self.product_id.trim().is_empty() {
            return Err(Error::Validation("product id is empty".into()));
        }
        if self.quantity < 1 || self.quantity > MAX_QUANTITY {
            return Err(Error::InvalidQuantity);
        }
        if self.unit_price <= 0 || self.unit_price > MAX_UNIT_PRICE_PAISE {
            return Err(Error::InvalidPrice);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    pub owner: OwnerId,
    pub items: Vec<LineItem>,
    pub last_modified: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for an owner who has never added anything. Not persisted
    /// until the first mutation.
    pub fn empty(owner: OwnerId) -> Self {
        Self {
            owner,
            items: vec![],
            last_modified: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert the item, or replace the quantity of an existing entry for the
    /// same product. Replace, not add: repeated add-to-cart for a product
    /// overwrites the quantity with the latest request.
    pub fn upsert_item(&mut self, item: LineItem) -> Result<(), Error> {
        item.validate()?;
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.touch();
        Ok(())
    }

    /// Replace the quantity of an existing entry. Zero removes the entry;
    /// there is no implicit insert through this path.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), Error> {
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
            self.touch();
            return Ok(());
        }
        if quantity > MAX_QUANTITY {
            return Err(Error::InvalidQuantity);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| Error::ItemNotFound {
                product_id: product_id.to_string(),
            })?;
        item.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Remove an entry. Removing something that is not there is fine.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
        self.touch();
    }

    /// Empty the cart, keeping the record itself.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::parse("meera@example.com").unwrap()
    }

    fn ring(quantity: u32) -> LineItem {
        LineItem {
            product_id: "ring-01".into(),
            name: "Gold Ring".into(),
            unit_price: 250_000,
            quantity,
            image_url: "https://cdn.example.com/ring-01.jpg".into(),
        }
    }

    #[test]
    fn add_replaces_quantity_for_same_product() {
        let mut cart = Cart::empty(owner());
        cart.upsert_item(ring(2)).unwrap();
        cart.upsert_item(ring(5)).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5); // replaced, not 7
    }

    #[test]
    fn add_rejects_bad_input() {
        let mut cart = Cart::empty(owner());
        assert!(matches!(
            cart.upsert_item(ring(0)),
            Err(Error::InvalidQuantity)
        ));
        let mut free = ring(1);
        free.unit_price = 0;
        assert!(matches!(cart.upsert_item(free), Err(Error::InvalidPrice)));
        assert!(cart.is_empty());
    }

    #[test]
    fn rejects_price_and_quantity_beyond_caps() {
        let mut cart = Cart::empty(owner());
        // An absurd price must never reach the pricing arithmetic.
        let mut heist = ring(1);
        heist.unit_price = i64::MAX / 2;
        assert!(matches!(cart.upsert_item(heist), Err(Error::InvalidPrice)));
        let mut hoard = ring(MAX_QUANTITY + 1);
        hoard.unit_price = 100;
        assert!(matches!(
            cart.upsert_item(hoard),
            Err(Error::InvalidQuantity)
        ));
        assert!(cart.is_empty());
        // Values at the caps are fine.
        let mut max_line = ring(MAX_QUANTITY);
        max_line.unit_price = MAX_UNIT_PRICE_PAISE;
        cart.upsert_item(max_line).unwrap();
        assert!(matches!(
            cart.set_quantity("ring-01", MAX_QUANTITY + 1),
            Err(Error::InvalidQuantity)
        ));
        assert_eq!(cart.items[0].quantity, MAX_QUANTITY);
    }

    #[test]
    fn quantity_zero_removes() {
        let mut cart = Cart::empty(owner());
        cart.upsert_item(ring(3)).unwrap();
        cart.set_quantity("ring-01", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_does_not_insert() {
        let mut cart = Cart::empty(owner());
        assert!(matches!(
            cart.set_quantity("ghost", 2),
            Err(Error::ItemNotFound { .. })
        ));
        // but zero on an absent product is still fine
        cart.set_quantity("ghost", 0).unwrap();
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::empty(owner());
        cart.upsert_item(ring(1)).unwrap();
        cart.remove_item("ring-01");
        cart.remove_item("ring-01");
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_keeps_the_record() {
        let mut cart = Cart::empty(owner());
        cart.upsert_item(ring(1)).unwrap();
        let before = cart.last_modified;
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.last_modified >= before);
    }
}
