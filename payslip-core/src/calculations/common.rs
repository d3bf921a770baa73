//! Common utility functions for payslip calculations.
//!
//! This module provides shared functionality used by the tax table and the
//! payslip calculator, including rounding to whole currency units.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of pay periods in a year for monthly payslips.
pub const MONTHS_IN_YEAR: u32 = 12;

/// Rounds a decimal value to a whole currency unit using banker's rounding.
///
/// Values exactly halfway between two whole units round to the even one,
/// so `0.5` becomes `0` and `1.5` becomes `2`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payslip_core::calculations::common::round_to_whole_number;
///
/// assert_eq!(round_to_whole_number(dec!(921.91)), dec!(922));
/// assert_eq!(round_to_whole_number(dec!(107.49)), dec!(107));
/// assert_eq!(round_to_whole_number(dec!(2.5)), dec!(2));
/// assert_eq!(round_to_whole_number(dec!(3.5)), dec!(4));
/// ```
pub fn round_to_whole_number(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}
