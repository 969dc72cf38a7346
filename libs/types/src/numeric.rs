//! Exact numeric types for prices and quantities
//!
//! Prices use rust_decimal for deterministic arithmetic (no floating-point
//! errors, midpoint pricing stays exact). Quantities are whole shares.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Limit or execution price
///
/// A price accepted by the engine is always strictly positive; `Price`
/// itself can hold any decimal so that validation errors can report the
/// rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal value
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Create a price, returning None unless it is strictly positive
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from a whole number of currency units
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse from a decimal string (e.g. "101.25")
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(value: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(value).map(Self)
    }

    /// Get the inner decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check that the price is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Exact midpoint of two prices
    ///
    /// Halves the gap rather than the sum, so two prices near
    /// `Decimal::MAX` do not overflow.
    pub fn midpoint(self, other: Price) -> Price {
        let (low, high) = if self.0 <= other.0 {
            (self.0, other.0)
        } else {
            (other.0, self.0)
        };
        Price(low + (high - low) / Decimal::TWO)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

/// Share count
///
/// Used both for an order's original size and for its remaining size, so
/// zero is representable (a fully filled order).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Subtract, returning None on underflow
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    /// Add, saturating at `u64::MAX`
    pub fn saturating_add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(rhs.0))
    }

    /// Notional value of this quantity at `price`, saturating at the
    /// largest representable decimal
    pub fn notional(&self, price: Price) -> Decimal {
        Decimal::from(self.0).saturating_mul(price.as_decimal())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Aggregates in views (depth levels, resting totals) saturate rather than
/// wrap; each order's own size always fits in a `u64`.
impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        *self = self.saturating_add(rhs);
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Quantity {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_ordering() {
        assert!(Price::from_u64(101) > Price::from_u64(100));
        assert!(Price::from_str("99.5").unwrap() < Price::from_u64(100));
    }

    #[test]
    fn test_price_try_new_rejects_non_positive() {
        assert!(Price::try_new(Decimal::ZERO).is_none());
        assert!(Price::try_new(Decimal::from(-5)).is_none());
        assert!(Price::try_new(Decimal::new(1, 2)).is_some());
    }

    #[test]
    fn test_price_midpoint_is_exact() {
        let mid = Price::from_u64(99).midpoint(Price::from_u64(100));
        assert_eq!(mid, Price::from_str("99.5").unwrap());
    }

    #[test]
    fn test_price_midpoint_near_decimal_max() {
        let top = Price::new(Decimal::MAX);
        assert_eq!(top.midpoint(top), top);

        let below = Price::new(Decimal::MAX - Decimal::TWO);
        assert_eq!(top.midpoint(below), Price::new(Decimal::MAX - Decimal::ONE));
        assert_eq!(below.midpoint(top), top.midpoint(below));
    }

    #[test]
    fn test_price_serialization() {
        let price = Price::from_str("3000.50").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let deserialized: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, deserialized);
    }

    #[test]
    fn test_quantity_checked_sub() {
        let q = Quantity::new(40);
        assert_eq!(q.checked_sub(Quantity::new(30)), Some(Quantity::new(10)));
        assert_eq!(q.checked_sub(Quantity::new(41)), None);
    }

    #[test]
    fn test_quantity_sum_and_notional() {
        let total: Quantity = [Quantity::new(10), Quantity::new(20), Quantity::new(5)]
            .iter()
            .sum();
        assert_eq!(total, Quantity::new(35));
        assert_eq!(
            Quantity::new(3).notional(Price::from_str("1.5").unwrap()),
            Decimal::from_str("4.5").unwrap()
        );
    }

    #[test]
    fn test_quantity_addition_saturates() {
        let max = Quantity::new(u64::MAX);
        assert_eq!(max + Quantity::new(2), max);

        let mut total = Quantity::new(u64::MAX - 1);
        total += Quantity::new(5);
        assert_eq!(total, max);

        let sum: Quantity = [max, max, Quantity::new(1)].iter().sum();
        assert_eq!(sum, max);
    }

    #[test]
    fn test_notional_saturates() {
        let value = Quantity::new(u64::MAX).notional(Price::new(Decimal::MAX));
        assert_eq!(value, Decimal::MAX);
    }
}
