//! Aurum Commerce
//!
//! Backend commerce service for a jewelry storefront.
//!
//! ## What lives here
//! - Server-side cart per customer email, with replace-on-add semantics
//! - One authoritative pricing calculator (subtotal, 18% GST, coupon, total)
//! - Checkout orchestration against a Razorpay-style payment gateway
//! - Durable order records with monotonic fulfillment status
//! - Customer shipping addresses
//!
//! Catalog management, auth, search, and the storefront UI are separate
//! systems; line items arrive denormalized and the authenticated owner email
//! is supplied by the caller.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod services;
pub mod store;

pub use error::{Error, ErrorKind, Result};
