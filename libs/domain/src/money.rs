//! Arbitrary-precision decimal arithmetic wrapper.
//!
//! Every monetary quantity in the pipeline flows through [`Money`] rather than
//! a bare `rust_decimal::Decimal` or, worse, a float. Centralizing the type
//! here means rounding mode and precision are decided once.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount, backed by a 28-digit-precision decimal.
///
/// `rust_decimal::Decimal` already carries 96 bits of mantissa (~28-29
/// significant digits), so `Money` is a thin newtype that pins the rounding
/// strategy used for division to banker's rounding (round-half-to-even) and
/// forbids constructing a value from a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

/// Error returned when a string cannot be parsed as a decimal amount.
#[derive(Debug, thiserror::Error)]
#[error("invalid decimal amount: {0}")]
pub struct ParseMoneyError(String);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Construct directly from a `Decimal`. Preferred over `From<f64>`, which
    /// intentionally does not exist on this type.
    pub fn from_decimal(value: Decimal) -> Self {
        Money(value)
    }

    /// Parse a decimal amount from a string (`parseDecimal` in the spec).
    pub fn parse(s: &str) -> Result<Self, ParseMoneyError> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|_| ParseMoneyError(s.to_string()))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Money {
        Money(self.0.abs())
    }

    pub fn multiply(&self, other: Money) -> Money {
        Money(self.0 * other.0)
    }

    pub fn multiply_scalar(&self, factor: Decimal) -> Money {
        Money(self.0 * factor)
    }

    /// Divide with banker's rounding, matching the spec's requirement that
    /// division never uses native rounding defaults.
    pub fn divide(&self, other: Money) -> Option<Money> {
        if other.is_zero() {
            return None;
        }
        let quotient = self.0.checked_div(other.0)?;
        Some(Money(
            quotient.round_dp_with_strategy(28, RoundingStrategy::MidpointNearestEven),
        ))
    }

    pub fn is_less_than_or_equal(&self, other: Money) -> bool {
        self.0 <= other.0
    }

    pub fn is_less_than(&self, other: Money) -> bool {
        self.0 < other.0
    }

    pub fn is_greater_than(&self, other: Money) -> bool {
        self.0 > other.0
    }

    pub fn min(&self, other: Money) -> Money {
        if self.0 <= other.0 {
            *self
        } else {
            other
        }
    }

    pub fn saturating_sub(&self, other: Money) -> Money {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() {
            Money::ZERO
        } else {
            Money(diff)
        }
    }

    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Render to a fixed number of decimal places (`toFixed(n)` in the spec),
    /// using banker's rounding.
    pub fn to_fixed(&self, places: u32) -> String {
        self.0
            .round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
            .to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl std::ops::Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}
