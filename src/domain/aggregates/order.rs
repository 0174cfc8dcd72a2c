//! Order record: the durable snapshot a successful checkout leaves behind.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::LineItem;
use crate::domain::pricing::PricingBreakdown;
use crate::domain::value_objects::OwnerId;
use crate::error::Error;

/// Days between order placement and the promised delivery date.
const DELIVERY_WINDOW_DAYS: i64 = 7;

/// A customer shipping address. Copied by value into orders at checkout so
/// later edits never rewrite purchase history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_default: bool,
}

impl Address {
    pub fn validate(&self) -> Result<(), Error> {
        if self.street.trim().is_empty() || self.city.trim().is_empty() {
            return Err(Error::Validation("street and city are required".into()));
        }
        if self.zip_code.len() != 6 || !self.zip_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation("zip code must be 6 digits".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(Error::Store(format!("unknown payment status {other:?}"))),
        }
    }
}

/// Gateway-side references for a captured payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub status: PaymentStatus,
}

/// Fulfillment progression. Strictly forward; an order never moves back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Confirmed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "processing" => Ok(OrderStatus::Processing),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(Error::Store(format!("unknown order status {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub expected: DateTime<Utc>,
    pub actual: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner: OwnerId,
    pub items: Vec<LineItem>,
    pub amounts: PricingBreakdown,
    pub payment: PaymentRef,
    pub shipping_address: Address,
    pub order_status: OrderStatus,
    pub delivery: DeliveryEstimate,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build the order snapshot at the end of a checkout. Payment has already
    /// been captured by the gateway at this point, so the reference goes in
    /// as `completed`.
    pub fn from_checkout(
        owner: OwnerId,
        items: Vec<LineItem>,
        amounts: PricingBreakdown,
        payment: PaymentRef,
        shipping_address: Address,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            owner,
            items,
            amounts,
            payment,
            shipping_address,
            order_status: OrderStatus::Processing,
            delivery: DeliveryEstimate {
                expected: now + Duration::days(DELIVERY_WINDOW_DAYS),
                actual: None,
            },
            created_at: now,
        }
    }

    /// Advance fulfillment status. Regressions are rejected; repeating the
    /// current status is a no-op.
    pub fn progress_to(&mut self, next: OrderStatus) -> Result<(), Error> {
        if next < self.order_status {
            return Err(Error::Validation(format!(
                "order status cannot move from {} back to {}",
                self.order_status.as_str(),
                next.as_str()
            )));
        }
        self.order_status = next;
        if next == OrderStatus::Delivered && self.delivery.actual.is_none() {
            self.delivery.actual = Some(Utc::now());
        }
        Ok(())
    }
}
