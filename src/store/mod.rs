//! Persistence ports.
//!
//! Every write that could race with another request goes through a single
//! atomic statement in the adapter (upsert / conditional update / delete),
//! never an application-level read-modify-write, so concurrent mutations of
//! the same cart degrade to last-committed-write-wins instead of losing
//! updates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Address, Cart, LineItem, Order};
use crate::domain::value_objects::OwnerId;
use crate::error::Result;

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait CartStore: Send + Sync {
    /// The owner's cart, or an empty one if they have never added anything.
    async fn fetch(&self, owner: &OwnerId) -> Result<Cart>;

    /// Insert the item or replace the existing entry for the same product
    /// (replace-not-merge). Returns the resulting item list.
    async fn upsert_item(&self, owner: &OwnerId, item: LineItem) -> Result<Vec<LineItem>>;

    /// Replace an existing entry's quantity; `0` removes it. Fails with
    /// `ItemNotFound` when the product is absent and the quantity is positive.
    async fn set_quantity(
        &self,
        owner: &OwnerId,
        product_id: &str,
        quantity: u32,
    ) -> Result<Vec<LineItem>>;

    /// Remove an entry; absent entries are not an error.
    async fn remove_item(&self, owner: &OwnerId, product_id: &str) -> Result<Vec<LineItem>>;

    /// Empty the cart but keep the record.
    async fn clear(&self, owner: &OwnerId) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. Returns `false` (and writes nothing) when an
    /// order with the same gateway order id already exists.
    async fn insert(&self, order: &Order) -> Result<bool>;

    async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>>;

    /// All orders for an owner, newest first.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list_addresses(&self, owner: &OwnerId) -> Result<Vec<Address>>;

    async fn get_address(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Address>>;

    /// Insert or replace an address. When `is_default` is set, any previous
    /// default for the owner is demoted in the same transaction.
    async fn upsert_address(&self, owner: &OwnerId, address: Address) -> Result<Address>;

    async fn set_default_address(&self, owner: &OwnerId, id: Uuid) -> Result<Vec<Address>>;

    /// Delete an address; absent ids are not an error.
    async fn delete_address(&self, owner: &OwnerId, id: Uuid) -> Result<()>;
}
