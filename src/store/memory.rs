//! In-memory adapters, used by the test suite and for running the service
//! without a database. Semantics are delegated to the domain aggregates so
//! they stay byte-for-byte aligned with the Postgres adapters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Address, Cart, LineItem, Order};
use crate::domain::value_objects::OwnerId;
use crate::error::{Error, Result};

#[derive(Default)]
pub struct MemoryCartStore {
    carts: Mutex<HashMap<String, Cart>>,
    fail_clears: AtomicBool,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `clear` calls fail, to exercise the best-effort
    /// clear-after-order path.
    pub fn fail_clears(&self, fail: bool) {
        self.fail_clears.store(fail, Ordering::SeqCst);
    }

    fn with_cart<T>(&self, owner: &OwnerId, f: impl FnOnce(&mut Cart) -> Result<T>) -> Result<T> {
        let mut carts = self.carts.lock().unwrap_or_else(|e| e.into_inner());
        let cart = carts
            .entry(owner.as_str().to_string())
            .or_insert_with(|| Cart::empty(owner.clone()));
        f(cart)
    }
}

#[async_trait]
impl super::CartStore for MemoryCartStore {
    async fn fetch(&self, owner: &OwnerId) -> Result<Cart> {
        let carts = self.carts.lock().unwrap_or_else(|e| e.into_inner());
        Ok(carts
            .get(owner.as_str())
            .cloned()
            .unwrap_or_else(|| Cart::empty(owner.clone())))
    }

    async fn upsert_item(&self, owner: &OwnerId, item: LineItem) -> Result<Vec<LineItem>> {
        self.with_cart(owner, |cart| {
            cart.upsert_item(item)?;
            Ok(cart.items.clone())
        })
    }

    async fn set_quantity(
        &self,
        owner: &OwnerId,
        product_id: &str,
        quantity: u32,
    ) -> Result<Vec<LineItem>> {
        self.with_cart(owner, |cart| {
            cart.set_quantity(product_id, quantity)?;
            Ok(cart.items.clone())
        })
    }

    async fn remove_item(&self, owner: &OwnerId, product_id: &str) -> Result<Vec<LineItem>> {
        self.with_cart(owner, |cart| {
            cart.remove_item(product_id);
            Ok(cart.items.clone())
        })
    }

    async fn clear(&self, owner: &OwnerId) -> Result<()> {
        if self.fail_clears.load(Ordering::SeqCst) {
            return Err(Error::Store("cart store unavailable".into()));
        }
        self.with_cart(owner, |cart| {
            cart.clear();
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    fail_inserts: AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts fail, to exercise the reconciliation path.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl super::OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<bool> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Store("order store unavailable".into()));
        }
        let mut orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        if orders
            .iter()
            .any(|o| o.payment.gateway_order_id == order.payment.gateway_order_id)
        {
            return Ok(false);
        }
        orders.push(order.clone());
        Ok(true)
    }

    async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
        let orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        Ok(orders
            .iter()
            .find(|o| o.payment.gateway_order_id == gateway_order_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Order>> {
        let orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        let mut mine: Vec<Order> = orders
            .iter()
            .filter(|o| o.owner == *owner)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}

#[derive(Default)]
pub struct MemoryCustomerStore {
    addresses: Mutex<HashMap<String, Vec<Address>>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::CustomerStore for MemoryCustomerStore {
    async fn list_addresses(&self, owner: &OwnerId) -> Result<Vec<Address>> {
        let addresses = self.addresses.lock().unwrap_or_else(|e| e.into_inner());
        Ok(addresses.get(owner.as_str()).cloned().unwrap_or_default())
    }

    async fn get_address(&self, owner: &OwnerId, id: Uuid) -> Result<Option<Address>> {
        let addresses = self.addresses.lock().unwrap_or_else(|e| e.into_inner());
        Ok(addresses
            .get(owner.as_str())
            .and_then(|list| list.iter().find(|a| a.id == id).cloned()))
    }

    async fn upsert_address(&self, owner: &OwnerId, address: Address) -> Result<Address> {
        let mut addresses = self.addresses.lock().unwrap_or_else(|e| e.into_inner());
        let list = addresses.entry(owner.as_str().to_string()).or_default();
        if address.is_default {
            for a in list.iter_mut() {
                a.is_default = false;
            }
        }
        match list.iter_mut().find(|a| a.id == address.id) {
            Some(existing) => *existing = address.clone(),
            None => list.push(address.clone()),
        }
        Ok(address)
    }

    async fn set_default_address(&self, owner: &OwnerId, id: Uuid) -> Result<Vec<Address>> {
        let mut addresses = self.addresses.lock().unwrap_or_else(|e| e.into_inner());
        let list = addresses.entry(owner.as_str().to_string()).or_default();
        if !list.iter().any(|a| a.id == id) {
            return Err(Error::AddressNotFound { id: id.to_string() });
        }
        for a in list.iter_mut() {
            a.is_default = a.id == id;
        }
        Ok(list.clone())
    }

    async fn delete_address(&self, owner: &OwnerId, id: Uuid) -> Result<()> {
        let mut addresses = self.addresses.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = addresses.get_mut(owner.as_str()) {
            list.retain(|a| a.id != id);
        }
        Ok(())
    }
}
