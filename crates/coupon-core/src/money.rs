//! # Money Module
//!
//! Provides the `Money` type for list prices and discounted prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  1999 × (1 - 15/100) in floating point = 1699.1499999999999            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Fixed-Point Percent                     │
//! │    (1999 × 85·10¹² + 50·10¹²) / 100·10¹² = 1699                        │
//! │    Every rounding step is explicit and reproducible                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coupon_core::money::Money;
//! use coupon_core::types::PercentOff;
//!
//! let list = Money::from_cents(1000); // $10.00
//!
//! assert_eq!(list.less_fixed(Money::from_cents(300)).cents(), 700);
//! assert_eq!(list.less_percentage(PercentOff::from_bps(2500)).cents(), 750);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use ts_rs::TS;

use crate::types::PercentOff;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Signed so that a savings amount and a price share one type, but the
/// engine only ever produces non-negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    ///
    /// let price = Money::from_cents(12500); // $125.00
    /// assert_eq!(price.cents(), 12500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Subtracts a fixed discount, flooring at zero.
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    ///
    /// let list = Money::from_cents(100);
    /// // $5.00 off a $1.00 item is free, never negative
    /// assert_eq!(list.less_fixed(Money::from_cents(500)).cents(), 0);
    /// ```
    pub fn less_fixed(&self, discount: Money) -> Money {
        Money(self.0.saturating_sub(discount.0).max(0))
    }

    /// Applies a percentage discount and returns the remaining price.
    ///
    /// ## Rounding
    /// Round half up on the remaining price:
    /// `(cents × (FULL - units) + FULL / 2) / FULL`, computed in `i128`.
    /// For non-negative prices this is the same as rounding the exact
    /// product to the nearest cent with ties going up.
    ///
    /// ```text
    ///      101 cents at 50%      →  50.5    →  51
    ///        1 cent  at 50%      →   0.5    →   1
    ///     1999 cents at 15%      → 1699.15  → 1699
    ///  1000000 cents at 0.004%   → 999960   → 999960
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use coupon_core::money::Money;
    /// use coupon_core::types::PercentOff;
    ///
    /// let list = Money::from_cents(101);
    /// assert_eq!(list.less_percentage(PercentOff::from_bps(5000)).cents(), 51);
    /// ```
    pub fn less_percentage(&self, off: PercentOff) -> Money {
        let full = PercentOff::FULL as i128;
        let keep = full - off.units().min(PercentOff::FULL) as i128;
        let remaining = (self.0 as i128 * keep + full / 2) / full;
        Money(remaining as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$D.CC` (debugging and log output only).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(495000).to_string(), "$4950.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_subtraction() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b - a).cents(), -750);
    }

    #[test]
    fn test_less_fixed_floors_at_zero() {
        let list = Money::from_cents(1000);
        assert_eq!(list.less_fixed(Money::from_cents(300)).cents(), 700);
        assert_eq!(list.less_fixed(Money::from_cents(1000)).cents(), 0);
        assert_eq!(list.less_fixed(Money::from_cents(5000)).cents(), 0);
        assert_eq!(list.less_fixed(Money::from_cents(i64::MAX)).cents(), 0);
    }

    #[test]
    fn test_less_percentage_basic() {
        let list = Money::from_cents(1000);
        assert_eq!(list.less_percentage(PercentOff::from_bps(2500)).cents(), 750);
        assert_eq!(list.less_percentage(PercentOff::from_bps(0)).cents(), 1000);
        assert_eq!(list.less_percentage(PercentOff::from_bps(10_000)).cents(), 0);
    }

    /// Ties always go up; odd cents at 50% lock the rounding rule.
    #[test]
    fn test_less_percentage_rounds_half_up() {
        let half = PercentOff::from_bps(5000);
        assert_eq!(Money::from_cents(101).less_percentage(half).cents(), 51);
        assert_eq!(Money::from_cents(103).less_percentage(half).cents(), 52);
        assert_eq!(Money::from_cents(1).less_percentage(half).cents(), 1);
        assert_eq!(Money::from_cents(0).less_percentage(half).cents(), 0);
    }

    #[test]
    fn test_less_percentage_no_float_drift() {
        let off = PercentOff::from_bps(1500);
        assert_eq!(Money::from_cents(1999).less_percentage(off).cents(), 1699);
    }

    /// Sub-basis-point percentages are applied exactly, not rounded first.
    #[test]
    fn test_less_percentage_fine_grained() {
        let million = Money::from_cents(1_000_000);
        let off = |units: u64| PercentOff::from_units(units);
        let scale = PercentOff::SCALE;

        // 0.004%
        assert_eq!(million.less_percentage(off(4 * scale / 1000)).cents(), 999_960);
        // 0.005%
        assert_eq!(million.less_percentage(off(5 * scale / 1000)).cents(), 999_950);
        // 33.333%
        assert_eq!(million.less_percentage(off(33_333 * scale / 1000)).cents(), 666_670);
        // 12.345% of 2000.00 is 246.90 off
        let list = Money::from_cents(200_000);
        assert_eq!(list.less_percentage(off(12_345 * scale / 1000)).cents(), 175_310);
        // 0.0005% of 100 cents leaves 99.9995, which rounds back to 100
        let dollar = Money::from_cents(100);
        assert_eq!(dollar.less_percentage(off(5 * scale / 10_000)).cents(), 100);
    }

    #[test]
    fn test_less_percentage_large_amount_does_not_overflow() {
        let list = Money::from_cents(i64::MAX);
        let result = list.less_percentage(PercentOff::from_bps(1));
        assert!(result.cents() <= i64::MAX);
        assert!(result.cents() > 0);
    }
}
