//! Commerce domain: value objects, pricing, and the cart/order aggregates.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod value_objects;
