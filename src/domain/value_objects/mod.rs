//! Value objects shared across the commerce domain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Authenticated customer identity: a case-insensitive email, stored
/// lowercased. This is the sharding key for carts and orders.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn parse(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into().trim().to_lowercase();
        if !validator::validate_email(value.as_str()) {
            return Err(Error::InvalidOwner);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Whole percent off the subtotal, 0–100.
    Percentage,
    /// Flat amount off, in paise.
    Fixed,
}

/// A coupon lives only for the duration of a checkout session; it is never
/// persisted on the cart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
}

impl Coupon {
    pub fn new(
        code: impl Into<String>,
        discount_type: DiscountType,
        value: i64,
    ) -> Result<Self, Error> {
        let code = code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(Error::Validation("coupon code is empty".into()));
        }
        if value < 0 {
            return Err(Error::Validation("coupon value must be non-negative".into()));
        }
        if discount_type == DiscountType::Percentage && value > 100 {
            return Err(Error::Validation(
                "percentage coupon cannot exceed 100".into(),
            ));
        }
        Ok(Self {
            code,
            discount_type,
            value,
        })
    }
}
