//! Application services: per-request objects over the persistence ports.
pub mod cart;
pub mod checkout;

pub use cart::CartService;
pub use checkout::{CheckoutService, ConfirmCheckout};
