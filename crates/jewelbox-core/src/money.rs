//! # Money Module
//!
//! Provides the `Money` type for handling shekel amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    149.9 * 3 = 449.70000000000005  ❌ WRONG on a receipt!               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer agorot (1/100 ₪)                                 │
//! │    14990 * 3 = 44970 agorot → "₪449.70"                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use jewelbox_core::money::Money;
//!
//! let price = Money::from_minor(14990); // ₪149.90
//! let line = price.multiply_quantity(2); // ₪299.80
//! assert_eq!(line.to_string(), "₪299.80");
//!
//! let parsed: Money = "149.90".parse().unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Percentage;
use crate::CURRENCY_SYMBOL;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in agorot (the minor unit of the shekel).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate `subtotal + shipping - discount` may dip
///   below zero before being clamped
/// - **Single field tuple struct**: serializes as a plain integer
/// - **Saturating arithmetic**: stored carts are not re-validated, so sums
///   and products clamp at the `i64` bounds instead of panicking
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► CartLineItem.unit_price ──► line total               │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │  Cart.subtotal ──► + shipping ──► - discount ──► OrderTotals.total     │
/// │                                                                         │
/// │  Displayed as "₪149.90" only at the presentation boundary               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from agorot.
    ///
    /// ## Example
    /// ```rust
    /// use jewelbox_core::money::Money;
    ///
    /// let price = Money::from_minor(2500); // ₪25.00
    /// assert_eq!(price.minor(), 2500);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole shekels.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from shekels and agorot.
    ///
    /// ## Note
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -₪5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in agorot.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole-shekel portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the agorot portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero shekels.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use jewelbox_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(10000); // ₪100.00
    /// assert_eq!(unit_price.multiply_quantity(2).minor(), 20000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `rate` of this amount, rounded half-up to the nearest agora.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use jewelbox_core::money::Money;
    /// use jewelbox_core::types::Percentage;
    ///
    /// let subtotal = Money::from_minor(19990);   // ₪199.90
    /// let rate = Percentage::from_bps(1500);     // 15%
    /// // 199.90 × 15% = 29.985 → ₪29.99
    /// assert_eq!(subtotal.percentage(rate).minor(), 2999);
    /// ```
    pub fn percentage(&self, rate: Percentage) -> Money {
        // i128 so that large amounts times 10000 cannot overflow
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(amount as i64)
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        if self.0 < 0 {
            Money::zero()
        } else {
            self
        }
    }

    /// Formats with an explicit currency symbol and two decimals.
    ///
    /// ## Example
    /// ```rust
    /// use jewelbox_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(2000).format_with_symbol("₪"), "₪20.00");
    /// assert_eq!(Money::from_minor(-550).format_with_symbol("$"), "-$5.50");
    /// ```
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the storefront's single-currency convention: `₪149.90`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol(CURRENCY_SYMBOL))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses decimal strings such as `"149.90"`, `"25"`, or `"0.5"`.
///
/// At most two fractional digits are accepted; anything finer than an agora
/// is rejected rather than silently rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must be a decimal number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a decimal number"));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let minor: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("must be a decimal number"))? * 10,
            _ => frac.parse().map_err(|_| invalid("must be a decimal number"))?,
        };

        let total = major
            .checked_mul(100)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -total } else { total }))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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
    fn test_from_minor() {
        let money = Money::from_minor(14990);
        assert_eq!(money.minor(), 14990);
        assert_eq!(money.major(), 149);
        assert_eq!(money.minor_part(), 90);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
        assert_eq!(Money::from_major(25).minor(), 2500);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "₪10.99");
        assert_eq!(Money::from_minor(500).to_string(), "₪5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-₪5.50");
        assert_eq!(Money::zero().to_string(), "₪0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("149.90".parse::<Money>().unwrap().minor(), 14990);
        assert_eq!("25".parse::<Money>().unwrap().minor(), 2500);
        assert_eq!("0.5".parse::<Money>().unwrap().minor(), 50);
        assert_eq!(".75".parse::<Money>().unwrap().minor(), 75);
        assert_eq!("-5.50".parse::<Money>().unwrap().minor(), -550);
        assert_eq!(" 20.00 ".parse::<Money>().unwrap().minor(), 2000);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.999".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_minor(200);
        assert_eq!(c.minor(), 1300);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_minor(i64::MAX / 2 + 1);

        assert_eq!(huge.multiply_quantity(2).minor(), i64::MAX);
        assert_eq!((huge * 10).minor(), i64::MAX);
        assert_eq!((huge + huge).minor(), i64::MAX);
        assert_eq!((Money::from_minor(i64::MIN) - Money::from_minor(1)).minor(), i64::MIN);

        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total.minor(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_minor(100), Money::from_minor(250), Money::from_minor(5)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.minor(), 355);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_percentage_rounding() {
        let subtotal = Money::from_minor(30000);
        assert_eq!(subtotal.percentage(Percentage::from_bps(10000)).minor(), 30000);
        assert_eq!(subtotal.percentage(Percentage::from_bps(1000)).minor(), 3000);

        // 333 × 50% = 166.5 → 167 (half-up)
        assert_eq!(Money::from_minor(333).percentage(Percentage::from_bps(5000)).minor(), 167);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_minor(-1).non_negative(), Money::zero());
        assert_eq!(Money::from_minor(42).non_negative().minor(), 42);
    }

    /// 149.9 × 3 drifts in floating point; in agorot it is exact.
    #[test]
    fn test_no_floating_point_drift() {
        let price: Money = "149.90".parse().unwrap();
        assert_eq!(price.multiply_quantity(3).to_string(), "₪449.70");

        let tenth: Money = "0.10".parse().unwrap();
        let twentieth: Money = "0.20".parse().unwrap();
        assert_eq!((tenth + twentieth).to_string(), "₪0.30");
    }
}
