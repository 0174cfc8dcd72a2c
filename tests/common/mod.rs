//! Shared fixtures: memory-backed services and a fake payment gateway.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use aurum_commerce::domain::aggregates::{Address, LineItem};
use aurum_commerce::gateway::{GatewayError, GatewayOrder, PaymentConfirmation, PaymentGateway};
use aurum_commerce::services::{CartService, CheckoutService};
use aurum_commerce::store::memory::{MemoryCartStore, MemoryCustomerStore, MemoryOrderStore};
use aurum_commerce::store::CustomerStore;

/// Gateway double: hands out sequential order ids, or fails on demand.
#[derive(Default)]
pub struct FakeGateway {
    fail: AtomicBool,
    counter: AtomicU64,
}

impl FakeGateway {
    pub fn fail_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Request("connection refused".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            gateway_order_id: format!("order_fake_{n}"),
            amount,
            currency: currency.to_string(),
        })
    }
}

pub struct Harness {
    pub carts: Arc<MemoryCartStore>,
    pub orders: Arc<MemoryOrderStore>,
    pub customers: Arc<MemoryCustomerStore>,
    pub gateway: Arc<FakeGateway>,
    pub cart: CartService,
    pub checkout: CheckoutService,
}

pub fn harness() -> Harness {
    let carts = Arc::new(MemoryCartStore::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let customers = Arc::new(MemoryCustomerStore::new());
    let gateway = Arc::new(FakeGateway::default());
    let cart = CartService::new(carts.clone());
    let checkout = CheckoutService::new(
        carts.clone(),
        orders.clone(),
        customers.clone(),
        gateway.clone(),
        None,
    );
    Harness {
        carts,
        orders,
        customers,
        gateway,
        cart,
        checkout,
    }
}

pub const OWNER: &str = "meera@example.com";

pub fn pendant(quantity: u32) -> LineItem {
    LineItem {
        product_id: "42".into(),
        name: "Silver Pendant".into(),
        unit_price: 50_000,
        quantity,
        image_url: "https://cdn.example.com/pendant-42.jpg".into(),
    }
}

pub fn bangle(quantity: u32) -> LineItem {
    LineItem {
        product_id: "77".into(),
        name: "Gold Bangle".into(),
        unit_price: 125_000,
        quantity,
        image_url: "https://cdn.example.com/bangle-77.jpg".into(),
    }
}

pub async fn seed_address(h: &Harness) -> Uuid {
    let owner = aurum_commerce::domain::value_objects::OwnerId::parse(OWNER).unwrap();
    let address = Address {
        id: Uuid::new_v4(),
        label: "Home".into(),
        street: "14 MG Road".into(),
        city: "Pune".into(),
        state: "MH".into(),
        zip_code: "411001".into(),
        is_default: true,
    };
    let id = address.id;
    h.customers.upsert_address(&owner, address).await.unwrap();
    id
}

pub fn confirmation(tag: &str) -> PaymentConfirmation {
    PaymentConfirmation {
        payment_id: format!("pay_{tag}"),
        gateway_order_id: format!("order_{tag}"),
        signature: format!("sig_{tag}"),
    }
}
