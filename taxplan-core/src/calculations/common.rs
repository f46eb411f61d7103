//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the deduction,
//! liability and comparison calculations: rounding, clamping, percentages
//! and financial-year arithmetic.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxplan_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to the nearest whole rupee, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxplan_core::calculations::common::round_to_rupee;
///
/// assert_eq!(round_to_rupee(dec!(2600.49)), dec!(2600));
/// assert_eq!(round_to_rupee(dec!(2600.50)), dec!(2601));
/// ```
pub fn round_to_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// `part / whole × 100`, rounded to two places. Zero when `whole` is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use taxplan_core::calculations::common::percentage;
///
/// assert_eq!(percentage(dec!(1), dec!(3)), dec!(33.33));
/// assert_eq!(percentage(dec!(10), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn percentage(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_half_up(part / whole * Decimal::ONE_HUNDRED)
}

/// Indian financial year (April to March) containing `date`, as `YYYY-YY`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use taxplan_core::calculations::common::financial_year;
///
/// assert_eq!(financial_year(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), "2025-26");
/// assert_eq!(financial_year(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()), "2025-26");
/// ```
pub fn financial_year(date: NaiveDate) -> String {
    let start = financial_year_start(date);
    format!("{}-{:02}", start, (start + 1) % 100)
}

/// Last day (31 March) of the financial year containing `date`.
pub fn financial_year_end(date: NaiveDate) -> NaiveDate {
    let end_year = financial_year_start(date) + 1;
    NaiveDate::from_ymd_opt(end_year, 3, 31).unwrap_or(date)
}

fn financial_year_start(date: NaiveDate) -> i32 {
    if date.month() >= 4 { date.year() } else { date.year() - 1 }
}

/// Whole months from `from` to `to`, counting a started month as a full one.
/// Zero when `to` is not after `from`.
pub fn months_until(
    from: NaiveDate,
    to: NaiveDate,
) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() > from.day() {
        months += 1;
    }
    u32::try_from(months).unwrap_or(0)
}
