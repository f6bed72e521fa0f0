//! Fixed-point money helpers.
//!
//! All monetary amounts are stored and computed as integer cents; `Decimal`
//! is only used at the API boundary. Price * quantity therefore stays in
//! plain `i64` arithmetic at the 2-decimal scale.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Convert an API-supplied decimal amount into cents.
///
/// Returns `None` when the value carries sub-cent precision or does not fit
/// in an `i64`. Sign is preserved; range checks are the caller's concern.
pub fn cents_from_decimal(value: Decimal) -> Option<i64> {
    let scaled = value.checked_mul(Decimal::ONE_HUNDRED)?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_i64()
}

/// Render cents as a two-decimal `Decimal` for responses.
pub fn decimal_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Cost attributed to `sold` shares out of a holding of `quantity` shares
/// with total `cost_basis` cents.
///
/// The per-share average is truncated toward zero at the cent scale; any
/// residual stays on the remaining holding.
pub fn prorated_cost(cost_basis: i64, quantity: i64, sold: i64) -> i64 {
    if quantity == 0 {
        return 0;
    }
    (cost_basis / quantity) * sold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_whole_cent_amounts() {
        assert_eq!(cents_from_decimal(dec!(45.00)), Some(4500));
        assert_eq!(cents_from_decimal(dec!(0.01)), Some(1));
        assert_eq!(cents_from_decimal(dec!(100)), Some(10000));
        assert_eq!(cents_from_decimal(dec!(-2.50)), Some(-250));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        assert_eq!(cents_from_decimal(dec!(45.001)), None);
        assert_eq!(cents_from_decimal(dec!(0.005)), None);
    }

    #[test]
    fn round_trips_through_decimal() {
        assert_eq!(decimal_from_cents(4500), dec!(45.00));
        assert_eq!(decimal_from_cents(1), dec!(0.01));
    }

    #[test]
    fn prorated_cost_truncates_toward_zero() {
        // 100.00 spread over 3 shares: 33.33 per share, residual 0.01
        assert_eq!(prorated_cost(10000, 3, 1), 3333);
        assert_eq!(prorated_cost(10000, 3, 3), 9999);
        assert_eq!(prorated_cost(10000, 4, 2), 5000);
        assert_eq!(prorated_cost(0, 5, 5), 0);
    }
}
