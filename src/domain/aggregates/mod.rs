//! Aggregates module
pub mod cart;
pub mod order;

pub use cart::{Cart, LineItem};
pub use order::{Address, DeliveryEstimate, Order, OrderStatus, PaymentRef, PaymentStatus};
