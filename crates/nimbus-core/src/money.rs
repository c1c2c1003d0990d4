//! # Money Module
//!
//! Provides the `Money` and `TaxRate` types for handling monetary values
//! safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing region totals in binary floating point:                        │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Console prices are fractional (hourly rates such as 0.0125), so       │
//! │  integer cents would round them away before aggregation.               │
//! │                                                                         │
//! │  OUR SOLUTION: 96-bit exact decimals                                    │
//! │    0.1 + 0.2 = 0.3 exactly, 28 significant digits                      │
//! │    Rounding happens only when a value is displayed                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nimbus_core::money::{Money, TaxRate};
//!
//! let price = Money::from_cents(1099); // 10.99
//! let total = price + Money::from_cents(500);
//! assert_eq!(total, Money::from_cents(1599));
//!
//! let tax = total.apply_rate(TaxRate::from_bps(1000)); // 10%
//! assert_eq!(tax.to_string(), "1.60");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::lenient;

// =============================================================================
// Money Type
// =============================================================================

/// A currency-agnostic monetary amount.
///
/// ## Design Decisions
/// - **Decimal, not cents**: fractional unit prices survive aggregation
/// - **Saturating addition**: a hostile payload cannot panic the screen
/// - **Lenient deserialize**: non-numeric JSON becomes zero
/// - **Serialized as a JSON number**: the frontend formats it
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  PricingRequest.total ──┐                                               │
/// │                         ├──► RegionStats.total ──► RegionBucket.total  │
/// │  PricingLine.total ─────┘                                               │
/// │                                                                         │
/// │  Quote subtotal ──► apply_rate(TaxRate) ──► TaxCalculation.total       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from hundredths of the currency unit.
    ///
    /// ## Example
    /// ```rust
    /// use nimbus_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Applies a percentage rate to this amount.
    ///
    /// No rounding is applied: `100 × 8.875%` is exactly `8.875`. Rounding
    /// is a presentation concern.
    ///
    /// ## Example
    /// ```rust
    /// use nimbus_core::money::{Money, TaxRate};
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::from_cents(10_000); // 100.00
    /// let tax = base.apply_rate(TaxRate::from_bps(825));
    /// assert_eq!(tax.amount(), Decimal::new(825, 2));
    /// ```
    pub fn apply_rate(&self, rate: TaxRate) -> Money {
        Money(self.0.saturating_mul(rate.fraction()))
    }

    /// Rounds half away from zero to two decimal places.
    pub fn round_to_cents(&self) -> Money {
        Money(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Display shows the amount rounded to two decimals, without a currency
/// symbol. Localized formatting belongs to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_to_cents().0)
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
        *self = *self + other;
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

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::deserialize_decimal(deserializer).map(Money)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate expressed as a percentage (8.25 = 8.25%).
///
/// The calculator does not clamp the range; admin validation enforces
/// `0..=100` when rules are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct TaxRate(#[ts(type = "number")] Decimal);

impl TaxRate {
    /// Creates a tax rate from a percentage.
    #[inline]
    pub const fn from_percentage(pct: Decimal) -> Self {
        TaxRate(pct)
    }

    /// Creates a tax rate from basis points (825 = 8.25%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        TaxRate(Decimal::new(i64::from(bps), 2))
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percentage(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (8.25% = 0.0825).
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Returns the rate in whole basis points, rounded half away from zero.
    pub fn bps(&self) -> i64 {
        (self.0.saturating_mul(Decimal::ONE_HUNDRED))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or_default()
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Renders the rate as a two-decimal percentage string: `"8.25%"`.
    pub fn format(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}%")
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl Serialize for TaxRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::deserialize_decimal(deserializer).map(TaxRate)
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
        assert_eq!(money.amount(), Decimal::new(1099, 2));
        assert_eq!(money.to_string(), "10.99");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Money::new(Decimal::new(125, 3)).to_string(), "0.13");
        assert_eq!(Money::new(Decimal::new(5, 0)).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_decimal_addition_is_exact() {
        let a = Money::new(Decimal::new(1, 1));
        let b = Money::new(Decimal::new(2, 1));
        assert_eq!(a + b, Money::new(Decimal::new(3, 1)));
    }

    #[test]
    fn test_addition_saturates() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max + Money::from_cents(100), Money::new(Decimal::MAX));
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(250), Money::zero()];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_cents(350));
        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_apply_rate_is_unrounded() {
        let base = Money::from_cents(10_000);
        let rate = TaxRate::from_percentage(Decimal::new(8875, 3)); // 8.875%
        assert_eq!(base.apply_rate(rate).amount(), Decimal::new(8875, 3));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(Money::from_cents(1).is_positive());
    }

    #[test]
    fn test_money_json_is_lenient() {
        let money: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(money, Money::from_cents(1250));
        let money: Money = serde_json::from_str("\"n/a\"").unwrap();
        assert!(money.is_zero());
        assert_eq!(serde_json::to_string(&Money::from_cents(1250)).unwrap(), "12.5");
    }

    #[test]
    fn test_tax_rate_conversions() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.percentage(), Decimal::new(825, 2));
        assert_eq!(rate.fraction(), Decimal::new(825, 4));
        assert_eq!(rate.bps(), 825);
        assert!(TaxRate::zero().is_zero());
    }

    #[test]
    fn test_tax_rate_format() {
        assert_eq!(TaxRate::from_bps(825).format(), "8.25%");
        assert_eq!(TaxRate::from_percentage(Decimal::from(5)).format(), "5.00%");
        assert_eq!(TaxRate::from_percentage(Decimal::new(8125, 3)).format(), "8.13%");
        assert_eq!(TaxRate::zero().to_string(), "0.00%");
    }
}
