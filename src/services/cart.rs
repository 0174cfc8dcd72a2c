//! Cart service: the validation boundary in front of the cart store.
//!
//! Owner identity is passed explicitly to every call; the service holds no
//! per-customer state of its own.

use std::sync::Arc;

use tracing::debug;

use crate::domain::aggregates::cart::MAX_QUANTITY;
use crate::domain::aggregates::{Cart, LineItem};
use crate::domain::value_objects::OwnerId;
use crate::error::{Error, Result};
use crate::store::CartStore;

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, owner: &str) -> Result<Cart> {
        let owner = OwnerId::parse(owner)?;
        self.store.fetch(&owner).await
    }

    /// Add or replace a line item (replace-not-merge on product id).
    pub async fn add_item(&self, owner: &str, item: LineItem) -> Result<Vec<LineItem>> {
        let owner = OwnerId::parse(owner)?;
        item.validate()?;
        debug!(owner = %owner, product_id = %item.product_id, quantity = item.quantity, "cart add");
        self.store.upsert_item(&owner, item).await
    }

    /// Set an existing item's quantity; zero removes it.
    pub async fn set_quantity(
        &self,
        owner: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<Vec<LineItem>> {
        if quantity > MAX_QUANTITY {
            return Err(Error::InvalidQuantity);
        }
        let owner = OwnerId::parse(owner)?;
        self.store.set_quantity(&owner, product_id, quantity).await
    }

    /// Remove an item; removing an absent item is a no-op.
    pub async fn remove_item(&self, owner: &str, product_id: &str) -> Result<Vec<LineItem>> {
        let owner = OwnerId::parse(owner)?;
        self.store.remove_item(&owner, product_id).await
    }

    /// Empty the cart, keeping the record.
    pub async fn clear(&self, owner: &str) -> Result<()> {
        let owner = OwnerId::parse(owner)?;
        self.store.clear(&owner).await
    }
}
