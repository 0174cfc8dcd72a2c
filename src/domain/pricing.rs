//! Authoritative pricing calculator.
//!
//! Every place that shows or charges a total goes through [`compute_totals`]
//! so the displayed figure and the charged figure can never drift apart.
//! All amounts are integer paise; rounding is half-up.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::cart::LineItem;
use crate::domain::value_objects::{Coupon, DiscountType};

/// GST-style flat tax rate, in whole percent.
pub const TAX_RATE_PERCENT: i64 = 18;

/// Derived totals for a cart or order. Not persisted on the cart; snapshotted
/// onto the order at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub subtotal: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

/// Round-half-up of `amount * percent / 100` in integer arithmetic.
/// Callers guarantee `amount >= 0` and `0 <= percent <= 100`.
fn percent_of(amount: i64, percent: i64) -> i64 {
    (amount * percent + 50) / 100
}

/// Compute subtotal, tax, discount and total for a set of line items and an
/// optional coupon. Pure and deterministic; safe to call on every read.
///
/// Non-positive quantities or prices are a caller contract violation and are
/// rejected at the cart boundary, not here. The boundary's price and
/// quantity caps are what keep this arithmetic inside `i64`.
pub fn compute_totals(items: &[LineItem], coupon: Option<&Coupon>) -> PricingBreakdown {
    let subtotal: i64 = items
        .iter()
        .map(|i| i.unit_price * i64::from(i.quantity))
        .sum();
    let tax = percent_of(subtotal, TAX_RATE_PERCENT);

    let discount = match coupon {
        None => 0,
        Some(c) => match c.discount_type {
            DiscountType::Percentage => percent_of(subtotal, c.value),
            // A flat coupon may never push the total negative.
            DiscountType::Fixed => c.value.min(subtotal + tax),
        },
    };

    PricingBreakdown {
        subtotal,
        tax,
        discount,
        total: (subtotal + tax - discount).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, unit_price: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id: product_id.into(),
            name: format!("product {product_id}"),
            unit_price,
            quantity,
            image_url: String::new(),
        }
    }

    #[test]
    fn empty_cart_is_all_zero() {
        let b = compute_totals(&[], None);
        assert_eq!(
            b,
            PricingBreakdown {
                subtotal: 0,
                tax: 0,
                discount: 0,
                total: 0
            }
        );
    }

    #[test]
    fn happy_path_scenario() {
        // 2 × ₹500 → subtotal ₹1000, 18% tax ₹180, total ₹1180.
        let items = [item("42", 50_000, 2)];
        let b = compute_totals(&items, None);
        assert_eq!(b.subtotal, 100_000);
        assert_eq!(b.tax, 18_000);
        assert_eq!(b.discount, 0);
        assert_eq!(b.total, 118_000);
    }

    #[test]
    fn fixed_coupon() {
        let items = [item("42", 50_000, 2)];
        let coupon = Coupon::new("FLAT50", DiscountType::Fixed, 5_000).unwrap();
        let b = compute_totals(&items, Some(&coupon));
        assert_eq!(b.discount, 5_000);
        assert_eq!(b.total, 113_000);
    }

    #[test]
    fn percentage_coupon_rounds_half_up() {
        // subtotal 333 paise, 10% = 33.3 → 33
        let items = [item("p", 111, 3)];
        let ten = Coupon::new("TEN", DiscountType::Percentage, 10).unwrap();
        assert_eq!(compute_totals(&items, Some(&ten)).discount, 33);
        // subtotal 335, 10% = 33.5 → 34
        let items = [item("p", 67, 5)];
        assert_eq!(compute_totals(&items, Some(&ten)).discount, 34);
    }

    #[test]
    fn overshoot_fixed_coupon_clamps_total_to_zero() {
        let items = [item("42", 1_000, 1)];
        let coupon = Coupon::new("HUGE", DiscountType::Fixed, 10_000_000).unwrap();
        let b = compute_totals(&items, Some(&coupon));
        assert_eq!(b.discount, b.subtotal + b.tax);
        assert_eq!(b.total, 0);
    }

    #[test]
    fn invariant_holds_for_assorted_inputs() {
        let carts: Vec<Vec<LineItem>> = vec![
            vec![],
            vec![item("a", 1, 1)],
            vec![item("a", 99_999, 3), item("b", 1_234, 7)],
            vec![item("a", 50_000, 2), item("b", 12_500, 1), item("c", 999, 9)],
        ];
        let coupons = [
            None,
            Some(Coupon::new("P0", DiscountType::Percentage, 0).unwrap()),
            Some(Coupon::new("P100", DiscountType::Percentage, 100).unwrap()),
            Some(Coupon::new("F", DiscountType::Fixed, 5_000).unwrap()),
            Some(Coupon::new("F2", DiscountType::Fixed, i64::MAX / 4).unwrap()),
        ];
        for items in &carts {
            for coupon in &coupons {
                let b = compute_totals(items, coupon.as_ref());
                assert!(b.total >= 0);
                assert!(b.discount >= 0);
                assert_eq!(b.total, (b.subtotal + b.tax - b.discount).max(0));
            }
        }
    }

    #[test]
    fn stays_in_range_at_the_boundary_caps() {
        use crate::domain::aggregates::cart::{MAX_QUANTITY, MAX_UNIT_PRICE_PAISE};
        // The largest line the cart boundary admits must not overflow the
        // tax or discount arithmetic.
        let items: Vec<LineItem> = (0..10)
            .map(|n| item(&n.to_string(), MAX_UNIT_PRICE_PAISE, MAX_QUANTITY))
            .collect();
        let hundred = Coupon::new("ALL", DiscountType::Percentage, 100).unwrap();
        for coupon in [None, Some(&hundred)] {
            let b = compute_totals(&items, coupon);
            assert!(b.subtotal > 0);
            assert!(b.tax > 0);
            assert!(b.discount >= 0);
            assert!(b.total >= 0);
            assert_eq!(b.total, b.subtotal + b.tax - b.discount);
        }
    }

    #[test]
    fn deterministic() {
        let items = [item("a", 12_345, 4), item("b", 678, 2)];
        let coupon = Coupon::new("TEN", DiscountType::Percentage, 10).unwrap();
        assert_eq!(
            compute_totals(&items, Some(&coupon)),
            compute_totals(&items, Some(&coupon))
        );
    }
}
