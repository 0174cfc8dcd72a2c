//! Checkout orchestrator.
//!
//! One checkout attempt walks the stages below strictly in sequence; a typed
//! failure from any stage stops the walk. There is no automatic retry at any
//! stage; retry policy belongs to the caller.
//!
//! ```text
//! CartReview → AddressSelected → PaymentOrderCreated
//!            → PaymentConfirmed → OrderPersisted → CartCleared
//! ```
//!
//! `PaymentOrderCreated` happens in [`CheckoutService::create_payment_order`]
//! before the customer pays; the remaining stages run in
//! [`CheckoutService::confirm`] once the payment widget calls back.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{CURRENCY, MIN_ORDER_AMOUNT_PAISE};
use crate::domain::aggregates::order::{PaymentRef, PaymentStatus};
use crate::domain::aggregates::Order;
use crate::domain::events::OrderEvent;
use crate::domain::pricing::compute_totals;
use crate::domain::value_objects::{Coupon, OwnerId};
use crate::error::{Error, Result};
use crate::gateway::{GatewayOrder, PaymentConfirmation, PaymentGateway};
use crate::store::{CartStore, CustomerStore, OrderStore};

/// Stage labels for checkout logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStage {
    CartReview,
    AddressSelected,
    PaymentOrderCreated,
    PaymentConfirmed,
    OrderPersisted,
    CartCleared,
}

impl CheckoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::CartReview => "cart_review",
            CheckoutStage::AddressSelected => "address_selected",
            CheckoutStage::PaymentOrderCreated => "payment_order_created",
            CheckoutStage::PaymentConfirmed => "payment_confirmed",
            CheckoutStage::OrderPersisted => "order_persisted",
            CheckoutStage::CartCleared => "cart_cleared",
        }
    }
}

/// Payment-widget callback payload plus everything needed to cut the order.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfirmCheckout {
    pub owner: String,
    /// Client-claimed total, cross-checked against the server-side
    /// computation before anything is persisted.
    pub amount: i64,
    #[serde(flatten)]
    pub confirmation: PaymentConfirmation,
    pub address_id: Option<Uuid>,
    pub coupon: Option<Coupon>,
}

#[derive(Clone)]
pub struct CheckoutService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    customers: Arc<dyn CustomerStore>,
    gateway: Arc<dyn PaymentGateway>,
    events: Option<async_nats::Client>,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        customers: Arc<dyn CustomerStore>,
        gateway: Arc<dyn PaymentGateway>,
        events: Option<async_nats::Client>,
    ) -> Self {
        Self {
            carts,
            orders,
            customers,
            gateway,
            events,
        }
    }

    /// Reserve a gateway order for the given total. One attempt, no retry;
    /// amounts below the ₹500 floor are rejected before the gateway is asked.
    pub async fn create_payment_order(&self, amount: i64) -> Result<GatewayOrder> {
        if amount < MIN_ORDER_AMOUNT_PAISE {
            return Err(Error::AmountTooLow {
                amount,
                minimum: MIN_ORDER_AMOUNT_PAISE,
            });
        }
        let receipt = format!("ORDER_{:010}", rand::random::<u32>());
        let order = self
            .gateway
            .create_order(amount, CURRENCY, &receipt)
            .await
            .map_err(|e| Error::PaymentOrderCreationFailed(e.to_string()))?;
        info!(
            stage = CheckoutStage::PaymentOrderCreated.as_str(),
            gateway_order_id = %order.gateway_order_id,
            amount,
            "payment order reserved"
        );
        Ok(order)
    }

    /// Finish a checkout after the payment widget reports a capture.
    ///
    /// Re-invoking with a gateway order id that already produced an order
    /// returns that order instead of creating a duplicate.
    pub async fn confirm(&self, request: ConfirmCheckout) -> Result<Order> {
        let owner = OwnerId::parse(&request.owner)?;

        if !request.confirmation.is_complete() {
            return Err(Error::IncompletePaymentConfirmation);
        }
        debug!(
            stage = CheckoutStage::PaymentConfirmed.as_str(),
            owner = %owner,
            gateway_order_id = %request.confirmation.gateway_order_id,
            "payment confirmation received"
        );

        // Idempotence: the first successful confirm empties the cart, so a
        // replay must be answered from the order book, not re-validated.
        if let Some(existing) = self
            .orders
            .find_by_gateway_order_id(&request.confirmation.gateway_order_id)
            .await?
        {
            info!(
                order_id = %existing.id,
                gateway_order_id = %request.confirmation.gateway_order_id,
                "confirm replayed; returning existing order"
            );
            return Ok(existing);
        }

        let cart = self.carts.fetch(&owner).await?;
        if cart.is_empty() {
            return Err(Error::EmptyCart);
        }
        debug!(
            stage = CheckoutStage::CartReview.as_str(),
            owner = %owner,
            items = cart.items.len(),
            "cart reviewed"
        );

        let address_id = request.address_id.ok_or(Error::NoAddressSelected)?;
        let address = self
            .customers
            .get_address(&owner, address_id)
            .await?
            .ok_or_else(|| Error::AddressNotFound {
                id: address_id.to_string(),
            })?;
        debug!(
            stage = CheckoutStage::AddressSelected.as_str(),
            owner = %owner,
            address_id = %address_id,
            "shipping address resolved"
        );

        // Deserialized coupons skip the constructor; re-validate bounds here.
        let coupon = request
            .coupon
            .map(|c| Coupon::new(c.code, c.discount_type, c.value))
            .transpose()?;

        // The stored cart plus the pricing calculator is authoritative; a
        // client that claims a different figure gets stopped before any write.
        let amounts = compute_totals(&cart.items, coupon.as_ref());
        if request.amount != amounts.total {
            return Err(Error::AmountMismatch {
                claimed: request.amount,
                computed: amounts.total,
            });
        }

        let order = Order::from_checkout(
            owner.clone(),
            cart.items,
            amounts,
            PaymentRef {
                gateway_order_id: request.confirmation.gateway_order_id.clone(),
                payment_id: request.confirmation.payment_id.clone(),
                signature: request.confirmation.signature.clone(),
                status: PaymentStatus::Completed,
            },
            address,
        );

        match self.orders.insert(&order).await {
            Ok(true) => {}
            // Lost the race to a concurrent confirm for the same payment.
            Ok(false) => {
                return self
                    .orders
                    .find_by_gateway_order_id(&request.confirmation.gateway_order_id)
                    .await?
                    .ok_or(Error::OrderNotFound);
            }
            Err(e) => {
                // Money has moved at the gateway but no order record exists.
                // Never retried here, never re-charged; flagged for manual
                // reconciliation.
                error!(
                    stage = CheckoutStage::OrderPersisted.as_str(),
                    owner = %owner,
                    gateway_order_id = %request.confirmation.gateway_order_id,
                    payment_id = %request.confirmation.payment_id,
                    error = %e,
                    "order persistence failed after successful payment; manual reconciliation required"
                );
                return Err(Error::OrderPersistenceFailed {
                    gateway_order_id: request.confirmation.gateway_order_id,
                    payment_id: request.confirmation.payment_id,
                    reason: e.to_string(),
                });
            }
        }
        info!(
            stage = CheckoutStage::OrderPersisted.as_str(),
            order_id = %order.id,
            total = order.amounts.total,
            "order persisted"
        );

        // Best-effort: the order exists, a stale cart is the lesser
        // inconsistency and the next cart write overwrites it.
        if let Err(e) = self.carts.clear(&owner).await {
            warn!(
                stage = CheckoutStage::CartCleared.as_str(),
                owner = %owner,
                order_id = %order.id,
                error = %e,
                "cart clear after order failed; leaving stale cart"
            );
        }

        self.publish(OrderEvent::Placed {
            order_id: order.id,
            owner_id: owner.as_str().to_string(),
            gateway_order_id: order.payment.gateway_order_id.clone(),
            total: order.amounts.total,
        })
        .await;

        Ok(order)
    }

    /// All orders for an owner, newest first.
    pub async fn orders_for(&self, owner: &str) -> Result<Vec<Order>> {
        let owner = OwnerId::parse(owner)?;
        self.orders.list_by_owner(&owner).await
    }

    async fn publish(&self, event: OrderEvent) {
        let Some(client) = &self.events else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to serialize order event");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            warn!(subject = event.subject(), error = %e, "failed to publish order event");
        }
    }
}
