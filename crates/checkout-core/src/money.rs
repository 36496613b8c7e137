//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    218.00 × 0.18 = 39.239999999999995 → may print as 39.23             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    21800 paise × 1800 bps = 3924 paise exactly                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Boundary Conversions
//! The persisted schema stores amounts as SQLite `REAL`. The database layer
//! converts with [`Money::from_major_f64`] / [`Money::to_major_f64`]; every
//! calculation happens on paise.
//!
//! ## Usage
//! ```rust
//! use checkout_core::money::Money;
//!
//! let price = Money::parse_decimal("49.00").unwrap();
//! let line: Money = price * 2;
//! assert_eq!(line.to_string(), "98.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──► CartLine.line_total() ──► CartSummary.subtotal       │
/// │                                                   │                     │
/// │                                    calculate_tax(TaxRate)               │
/// │                                                   │                     │
/// │                       CartSummary.total ◄─────────┘                     │
/// │                              │                                          │
/// │             Transaction row, invoice, exit-pass payload                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// ```rust
    /// use checkout_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(49, 50).paise(), 4950);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a stored `REAL` amount, rounding half away from zero to paise.
    pub fn from_major_f64(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Converts to a major-unit float for `REAL` columns.
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a plain decimal string such as `"49"`, `"49.5"` or `"120.00"`.
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - At most two fractional digits
    /// - No exponent, no thousands separators
    ///
    /// ```rust
    /// use checkout_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("49.5").unwrap().paise(), 4950);
    /// assert!(Money::parse_decimal("4.999").is_err());
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("'{}' {}", input, reason),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("is not a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("is not a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("has more than two decimal places"));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is out of range"))?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("is not a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("is not a number"))?,
        };

        let paise = major
            .checked_mul(100)
            .and_then(|p| p.checked_add(minor))
            .ok_or_else(|| invalid("is out of range"))?;

        Ok(Money(if negative { -paise } else { paise }))
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Calculates tax at `rate`, rounding half up to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 is the half
    /// in basis-point space.
    ///
    /// ```rust
    /// use checkout_core::money::Money;
    /// use checkout_core::types::TaxRate;
    ///
    /// let tax = Money::from_paise(21800).calculate_tax(TaxRate::from_bps(1800));
    /// assert_eq!(tax.paise(), 3924);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large subtotals cannot overflow the product
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(tax as i64)
    }

    /// Multiplies a unit price by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats with a currency symbol, e.g. `Rs. 257.24`.
    pub fn with_symbol(&self, symbol: &str) -> String {
        if symbol.is_empty() {
            self.to_string()
        } else {
            format!("{} {}", symbol, self)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimal places, no symbol: `257.24`, `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let text = format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part());
        f.pad(&text)
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(4950);
        assert_eq!(money.paise(), 4950);
        assert_eq!(money.rupees(), 49);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(25724).to_string(), "257.24");
        assert_eq!(Money::from_paise(500).to_string(), "5.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
        assert_eq!(format!("{:>8}", Money::from_paise(4900)), "   49.00");
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(Money::from_paise(21800).with_symbol("Rs."), "Rs. 218.00");
        assert_eq!(Money::from_paise(21800).with_symbol(""), "218.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("49").unwrap().paise(), 4900);
        assert_eq!(Money::parse_decimal("49.00").unwrap().paise(), 4900);
        assert_eq!(Money::parse_decimal(" 120.5 ").unwrap().paise(), 12050);
        assert_eq!(Money::parse_decimal(".75").unwrap().paise(), 75);
        assert_eq!(Money::parse_decimal("-2.10").unwrap().paise(), -210);

        assert!(matches!(
            Money::parse_decimal(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(Money::parse_decimal("12.345").is_err());
        assert!(Money::parse_decimal("1e3").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_float_boundary() {
        assert_eq!(Money::from_major_f64(39.24).paise(), 3924);
        assert_eq!(Money::from_major_f64(257.24).paise(), 25724);
        // 0.1 + 0.2 drift must not leak into paise
        assert_eq!(Money::from_major_f64(0.1 + 0.2).paise(), 30);
        assert_eq!(Money::from_paise(25724).to_major_f64(), 257.24);
    }

    #[test]
    fn test_tax_scenario_eighteen_percent() {
        // 49.00 × 2 + 120.00 = 218.00 → tax 39.24 → total 257.24
        let subtotal = Money::from_paise(4900) * 2 + Money::from_paise(12000);
        let tax = subtotal.calculate_tax(TaxRate::from_bps(1800));
        assert_eq!(subtotal.paise(), 21800);
        assert_eq!(tax.paise(), 3924);
        assert_eq!((subtotal + tax).to_string(), "257.24");
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 0.25 × 18% = 0.045 → 0.05
        assert_eq!(Money::from_paise(25).calculate_tax(TaxRate::from_bps(1800)).paise(), 5);
        // 0.24 × 18% = 0.0432 → 0.04
        assert_eq!(Money::from_paise(24).calculate_tax(TaxRate::from_bps(1800)).paise(), 4);
    }

    #[test]
    fn test_sum() {
        let total: Money = [4900, 4900, 12000].into_iter().map(Money::from_paise).sum();
        assert_eq!(total.paise(), 21800);
    }
}
