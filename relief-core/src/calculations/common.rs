//! Common utility functions for relief and tax calculations.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero, the convention used
/// on the LHDN forms.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use relief_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps negative amounts to zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use relief_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-5.00)), Decimal::ZERO);
/// assert_eq!(non_negative(dec!(5.00)), dec!(5.00));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// `part / whole` as a percentage rounded to two places; zero when `whole`
/// is not positive.
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(part * Decimal::ONE_HUNDRED / whole)
}
