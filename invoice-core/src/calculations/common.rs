//! Rounding shared by every monetary value that leaves the calculator.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Totals are computed at full precision and only rounded for display, so a
/// chain of edits never accumulates rounding error.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use invoice_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(19.994)), dec!(19.99));
/// assert_eq!(round_half_up(dec!(19.995)), dec!(20.00));
/// assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
