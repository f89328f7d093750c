//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing catalog prices as floats:                                     │
//! │    2.99 × 3 + 0.1 = 9.069999999999999  ❌ WRONG!                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    299 × 3 + 10 = 907 cents = $9.07                                    │
//! │    Cart totals are exact sums of exact line totals                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use recipecart_core::money::Money;
//!
//! let price = Money::from_cents(349); // $3.49
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 698);
//! assert_eq!(line.to_string(), "$6.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Where Money is Used
/// ```text
/// Product.regular_price ──┐
///                         ├──► select_price() ──► MatchedLine.effective_price
/// Product.promo_price ────┘                               │
///                                                         ▼
///                        MatchedLine.line_total = effective_price × packages
///                                                         │
///                                                         ▼
///                                   ShoppingResult.total_cost = Σ line_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use recipecart_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from dollars and cents.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
    ///
    /// ```rust
    /// use recipecart_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
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

    /// Returns the minor unit (cents) portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a package count.
    ///
    /// ```rust
    /// use recipecart_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Discount of `sale` relative to `regular`, in basis points.
    ///
    /// 1 basis point = 0.01%. Rounded half-up. Returns 0 when `regular`
    /// is not positive or the sale price is not lower.
    ///
    /// ```rust
    /// use recipecart_core::money::Money;
    ///
    /// // $4.00 → $3.00 is 25% off
    /// let bps = Money::discount_bps(Money::from_cents(400), Money::from_cents(300));
    /// assert_eq!(bps, 2500);
    /// ```
    pub fn discount_bps(regular: Money, sale: Money) -> u32 {
        if !regular.is_positive() || sale >= regular {
            return 0;
        }
        let savings = (regular.0 - sale.0) as i128;
        let bps = (savings * 10_000 + regular.0 as i128 / 2) / regular.0 as i128;
        bps as u32
    }

    /// Formats an optional price, `N/A` when absent.
    ///
    /// ```rust
    /// use recipecart_core::money::Money;
    ///
    /// assert_eq!(Money::format_optional(Some(Money::from_cents(250))), "$2.50");
    /// assert_eq!(Money::format_optional(None), "N/A");
    /// ```
    pub fn format_optional(value: Option<Money>) -> String {
        match value {
            Some(money) => money.to_string(),
            None => "N/A".to_string(),
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

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

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let by_packages: Money = a * 3u32;
        assert_eq!(by_packages.cents(), 3000);
    }

    #[test]
    fn test_sum_is_exact() {
        let lines = [
            Money::from_cents(299),
            Money::from_cents(299),
            Money::from_cents(299),
            Money::from_cents(10),
        ];
        let total: Money = lines.iter().sum();
        assert_eq!(total.cents(), 907);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_discount_bps() {
        assert_eq!(
            Money::discount_bps(Money::from_cents(399), Money::from_cents(299)),
            2506
        );
        // not on sale
        assert_eq!(
            Money::discount_bps(Money::from_cents(299), Money::from_cents(299)),
            0
        );
        assert_eq!(
            Money::discount_bps(Money::from_cents(299), Money::from_cents(350)),
            0
        );
        assert_eq!(Money::discount_bps(Money::zero(), Money::zero()), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_serializes_as_integer_cents() {
        let json = serde_json::to_string(&Money::from_cents(349)).unwrap();
        assert_eq!(json, "349");
        let back: Money = serde_json::from_str("125").unwrap();
        assert_eq!(back, Money::from_cents(125));
    }
}
