//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A 3.5ft × 2.3ft tarpaulin at 25.00/sqft in floating point:             │
//! │    8.049999999999999 sqft × 25 = 201.24999999999997  ❌ WHICH CENT?    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Exact Decimal Factors                    │
//! │    2500 cents × Decimal(8.05) = 20125.00 → 20125 cents                  │
//! │    Fractional factors are applied in `Decimal` and rounded ONCE,       │
//! │    half away from zero, back to whole cents.                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use press_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! // Create from cents (preferred)
//! let per_sqft = Money::from_cents(2500); // 25.00
//!
//! // Quantity multiplication stays integer
//! let copies = Money::from_cents(240) * 3; // 7.20
//! assert_eq!(copies.cents(), 720);
//!
//! // Fractional factors go through Decimal
//! let area = Decimal::new(12, 0);
//! assert_eq!(per_sqft.scale(area), Some(Money::from_cents(30000)));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction may go negative mid-calculation
///   (e.g. subtotal − discount before validation rejects it)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as a bare number**: `{"total": 41000}`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  RuleSet rates ──► price() ──► PriceResult.unit_price / total           │
/// │                                      │                                  │
/// │                                      ▼                                  │
/// │               CheckoutLine.amount ──► subtotal − discount ──► total     │
/// │                                                                         │
/// │  Every price the shop quotes or stores flows through this type          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    ///
    /// let rate = Money::from_cents(150); // 1.50 per page
    /// assert_eq!(rate.cents(), 150);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(25, 50).cents(), 2550);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts only the major unit carries the sign.
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

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Callers that take quantities from requests should use
    /// [`Money::checked_times`] instead; this one is for trusted values.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies by an integer count, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    ///
    /// let eyelet = Money::from_cents(1000);
    /// assert_eq!(eyelet.checked_times(6), Some(Money::from_cents(6000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub fn checked_times(&self, count: i64) -> Option<Self> {
        self.0.checked_mul(count).map(Money)
    }

    /// Adds, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts, `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies by an exact decimal factor and rounds to whole cents,
    /// half away from zero.
    ///
    /// Returns `None` if the product does not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 25.00 × 1.5 = 37.50
    /// let laminate = Money::from_cents(2500).scale(Decimal::new(15, 1));
    /// assert_eq!(laminate, Some(Money::from_cents(3750)));
    ///
    /// // 0.01 × 0.5 = 0.005 → rounds away from zero to 0.01
    /// let tiny = Money::from_cents(1).scale(Decimal::new(5, 1));
    /// assert_eq!(tiny, Some(Money::from_cents(1)));
    /// ```
    pub fn scale(&self, factor: Decimal) -> Option<Self> {
        Decimal::from(self.0)
            .checked_mul(factor)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }

    /// Divides by a positive integer and rounds to whole cents,
    /// half away from zero.
    ///
    /// Returns `None` when `divisor` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    ///
    /// // Average per-page price: 2400 cents over 10 pages
    /// assert_eq!(Money::from_cents(2400).divide_round(10), Some(Money::from_cents(240)));
    /// // 1000 / 3 = 333.33 → 333
    /// assert_eq!(Money::from_cents(1000).divide_round(3), Some(Money::from_cents(333)));
    /// assert_eq!(Money::from_cents(1000).divide_round(0), None);
    /// ```
    pub fn divide_round(&self, divisor: i64) -> Option<Self> {
        if divisor <= 0 {
            return None;
        }
        Decimal::from(self.0)
            .checked_div(Decimal::from(divisor))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }

    /// The midpoint of two amounts, rounded half away from zero.
    ///
    /// Used as the documented fallback rate when a document is set to
    /// auto-detect but no page analysis was supplied.
    ///
    /// ## Example
    /// ```rust
    /// use press_core::money::Money;
    ///
    /// let mid = Money::midpoint(Money::from_cents(200), Money::from_cents(100));
    /// assert_eq!(mid, Some(Money::from_cents(150)));
    ///
    /// // 2.01 and 1.00 → 1.505 → 1.51
    /// let mid = Money::midpoint(Money::from_cents(201), Money::from_cents(100));
    /// assert_eq!(mid, Some(Money::from_cents(151)));
    /// ```
    pub fn midpoint(a: Money, b: Money) -> Option<Self> {
        a.checked_add(b)?.divide_round(2)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering, no currency symbol.
///
/// ## Note
/// This is for logs and receipts in tests. The UI formats with its own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(41000).to_string(), "410.00");
        assert_eq!(Money::from_cents(240).to_string(), "2.40");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(4).cents(), 4000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(1000));

        let empty: Money = std::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_checked_ops_overflow() {
        let big = Money::from_cents(i64::MAX);
        assert_eq!(big.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(big.checked_times(2), None);
        assert_eq!(big.scale(Decimal::from(2)), None);
    }

    #[test]
    fn test_scale_area() {
        // 3.5ft × 2.3ft = 8.05 sqft at 25.00/sqft = 201.25
        let area = Decimal::new(35, 1) * Decimal::new(23, 1);
        let cost = Money::from_cents(2500).scale(area);
        assert_eq!(cost, Some(Money::from_cents(20125)));
    }

    #[test]
    fn test_scale_rounds_half_away_from_zero() {
        // 0.15 × 0.5 = 0.075 → 0.08 (not banker's 0.08 by luck: check 0.25 × 0.5)
        assert_eq!(
            Money::from_cents(25).scale(Decimal::new(5, 1)),
            Some(Money::from_cents(13))
        );
        assert_eq!(
            Money::from_cents(-25).scale(Decimal::new(5, 1)),
            Some(Money::from_cents(-13))
        );
    }

    #[test]
    fn test_divide_round() {
        assert_eq!(Money::from_cents(2400).divide_round(10), Some(Money::from_cents(240)));
        assert_eq!(Money::from_cents(5).divide_round(2), Some(Money::from_cents(3)));
        assert_eq!(Money::from_cents(100).divide_round(-1), None);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(
            Money::midpoint(Money::from_cents(200), Money::from_cents(100)),
            Some(Money::from_cents(150))
        );
        assert_eq!(
            Money::midpoint(Money::from_cents(i64::MAX), Money::from_cents(1)),
            None
        );
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_cents(41000)).unwrap();
        assert_eq!(json, "41000");
        let back: Money = serde_json::from_str("240").unwrap();
        assert_eq!(back, Money::from_cents(240));
    }
}
