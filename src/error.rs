//! Crate-wide error taxonomy.
//!
//! Four classes cross the module boundary (see [`Error::kind`]):
//! validation, not-found, upstream, and reconciliation. The last one is
//! special: the payment gateway has already captured money but the order
//! record could not be written, so it must never be presented to the
//! customer as an ordinary retryable failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // --- validation -------------------------------------------------------
    #[error("owner must be a well-formed email address")]
    InvalidOwner,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("unit price must be positive")]
    InvalidPrice,

    #[error("{0}")]
    Validation(String),

    #[error("order amount {amount} paise is below the {minimum} paise minimum")]
    AmountTooLow { amount: i64, minimum: i64 },

    #[error("cart is empty")]
    EmptyCart,

    #[error("no shipping address selected")]
    NoAddressSelected,

    #[error("payment confirmation is missing required fields")]
    IncompletePaymentConfirmation,

    #[error("claimed amount {claimed} does not match computed total {computed}")]
    AmountMismatch { claimed: i64, computed: i64 },

    // --- not found --------------------------------------------------------
    #[error("item {product_id} is not in the cart")]
    ItemNotFound { product_id: String },

    #[error("address {id} not found for this customer")]
    AddressNotFound { id: String },

    #[error("order not found")]
    OrderNotFound,

    // --- upstream ---------------------------------------------------------
    #[error("storage error: {0}")]
    Store(String),

    #[error("payment order creation failed: {0}")]
    PaymentOrderCreationFailed(String),

    // --- reconciliation ---------------------------------------------------
    #[error("payment {gateway_order_id} captured but order persistence failed: {reason}")]
    OrderPersistenceFailed {
        gateway_order_id: String,
        payment_id: String,
        reason: String,
    },
}

/// Coarse classification used by the HTTP layer and by callers deciding
/// whether a failure is even worth re-presenting to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Reconciliation,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOwner
            | Error::InvalidQuantity
            | Error::InvalidPrice
            | Error::Validation(_)
            | Error::AmountTooLow { .. }
            | Error::EmptyCart
            | Error::NoAddressSelected
            | Error::IncompletePaymentConfirmation
            | Error::AmountMismatch { .. } => ErrorKind::Validation,
            Error::ItemNotFound { .. } | Error::AddressNotFound { .. } | Error::OrderNotFound => {
                ErrorKind::NotFound
            }
            Error::Store(_) | Error::PaymentOrderCreationFailed(_) => ErrorKind::Upstream,
            Error::OrderPersistenceFailed { .. } => ErrorKind::Reconciliation,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciliation_is_its_own_class() {
        let e = Error::OrderPersistenceFailed {
            gateway_order_id: "order_x".into(),
            payment_id: "pay_y".into(),
            reason: "connection reset".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Reconciliation);
        assert_ne!(e.kind(), Error::Store("boom".into()).kind());
    }
}
