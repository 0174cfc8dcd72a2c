//! Payment gateway port.
//!
//! The gateway holds the money-side truth: an order is reserved with
//! [`PaymentGateway::create_order`], the customer pays inside the provider's
//! widget, and the widget calls back with a [`PaymentConfirmation`].
//! Signature verification of that callback is the provider SDK's concern,
//! not this module's.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod razorpay;

/// A provider-side payment reservation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
}

/// Fields delivered by the client-side payment widget after capture. An
/// order must never be persisted unless all three are present.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: String,
    pub gateway_order_id: String,
    pub signature: String,
}

impl PaymentConfirmation {
    pub fn is_complete(&self) -> bool {
        !self.payment_id.trim().is_empty()
            && !self.gateway_order_id.trim().is_empty()
            && !self.signature.trim().is_empty()
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway rejected the order: status {status}")]
    Rejected { status: u16 },

    #[error("gateway returned an unreadable response: {0}")]
    BadResponse(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reserve a gateway order for `amount` minor units. Single attempt, no
    /// retry; a failure here surfaces to the caller unchanged.
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;
}
