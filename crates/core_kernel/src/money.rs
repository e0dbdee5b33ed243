//! Toman amounts
//!
//! Wallet balances, reservations and request totals are whole tomans stored
//! as integers. Crypto quantities and quoted prices stay in `rust_decimal`
//! and are converted to tomans only through [`Tomans::from_decimal`], which
//! rounds half to even.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during toman arithmetic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount would become negative")]
    Underflow,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A non-negative amount of tomans
///
/// Construction rejects negative values, so any `Tomans` in the system is a
/// valid balance or transfer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Tomans(i64);

impl Tomans {
    pub const ZERO: Tomans = Tomans(0);

    /// Creates an amount, rejecting negative values
    pub fn new(value: i64) -> Result<Self, MoneyError> {
        if value < 0 {
            return Err(MoneyError::InvalidAmount(format!(
                "toman amount cannot be negative: {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Creates a strictly positive amount
    pub fn positive(value: i64) -> Result<Self, MoneyError> {
        if value <= 0 {
            return Err(MoneyError::InvalidAmount(format!(
                "toman amount must be positive: {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Converts a decimal toman value, rounding half to even
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        let whole = rounded.to_i64().ok_or(MoneyError::Overflow)?;
        Self::new(whole)
    }

    /// Returns the raw integer value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a decimal for price arithmetic
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(&self, other: Tomans) -> Result<Tomans, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Tomans)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtracts, failing if the result would go below zero
    pub fn checked_sub(&self, other: Tomans) -> Result<Tomans, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::Underflow);
        }
        Ok(Tomans(self.0 - other.0))
    }

    /// Sums a sequence of amounts with overflow checking
    pub fn checked_sum<I>(amounts: I) -> Result<Tomans, MoneyError>
    where
        I: IntoIterator<Item = Tomans>,
    {
        amounts
            .into_iter()
            .try_fold(Tomans::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl TryFrom<i64> for Tomans {
    type Error = MoneyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tomans> for i64 {
    fn from(amount: Tomans) -> i64 {
        amount.0
    }
}

impl fmt::Display for Tomans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} TMN", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_amount_rejected() {
        assert!(matches!(Tomans::new(-1), Err(MoneyError::InvalidAmount(_))));
        assert!(Tomans::new(0).is_ok());
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(Tomans::positive(0).is_err());
        assert_eq!(Tomans::positive(5).unwrap().value(), 5);
    }

    #[test]
    fn test_checked_sub_underflow() {
        let a = Tomans::new(10).unwrap();
        let b = Tomans::new(11).unwrap();
        assert_eq!(a.checked_sub(b), Err(MoneyError::Underflow));
        assert_eq!(b.checked_sub(a).unwrap(), Tomans::new(1).unwrap());
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Tomans::new(i64::MAX).unwrap();
        assert_eq!(max.checked_add(Tomans::new(1).unwrap()), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_from_decimal_rounds_half_to_even() {
        assert_eq!(Tomans::from_decimal(dec!(10.5)).unwrap().value(), 10);
        assert_eq!(Tomans::from_decimal(dec!(11.5)).unwrap().value(), 12);
        assert_eq!(Tomans::from_decimal(dec!(11.49)).unwrap().value(), 11);
    }

    #[test]
    fn test_from_decimal_rejects_negative() {
        assert!(Tomans::from_decimal(dec!(-3)).is_err());
    }

    #[test]
    fn test_serde_rejects_negative() {
        let ok: Tomans = serde_json::from_str("2500").unwrap();
        assert_eq!(ok.value(), 2500);
        assert!(serde_json::from_str::<Tomans>("-1").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "2500");
    }

    #[test]
    fn test_display() {
        assert_eq!(Tomans::new(1_000_000).unwrap().to_string(), "1000000 TMN");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_then_sub_is_identity(a in 0i64..1_000_000_000_000, b in 0i64..1_000_000_000_000) {
            let ta = Tomans::new(a).unwrap();
            let tb = Tomans::new(b).unwrap();
            prop_assert_eq!(ta.checked_add(tb).unwrap().checked_sub(tb).unwrap(), ta);
        }

        #[test]
        fn checked_sum_matches_integer_sum(values in proptest::collection::vec(0i64..1_000_000, 0..50)) {
            let expected: i64 = values.iter().sum();
            let total = Tomans::checked_sum(values.into_iter().map(|v| Tomans::new(v).unwrap())).unwrap();
            prop_assert_eq!(total.value(), expected);
        }
    }
}
