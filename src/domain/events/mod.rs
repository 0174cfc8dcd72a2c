//! Domain events published to NATS, best-effort.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed {
        order_id: Uuid,
        owner_id: String,
        gateway_order_id: String,
        total: i64,
    },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            OrderEvent::Placed { .. } => "commerce.orders.placed",
        }
    }
}
