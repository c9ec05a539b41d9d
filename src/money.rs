//! Fixed-point monetary type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement to ensure
//! consistent monetary calculations without floating-point errors.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A monetary amount that maintains exactly 2 decimal places.
///
/// This type wraps `rust_decimal::Decimal` and enforces a consistent scale
/// for all arithmetic operations. It also doubles as the per-period interest
/// rate type (a rate of 5 means 5% per period).
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use loan_ledger::Money;
///
/// let amount = Money::from_str("10000.5").unwrap();
/// assert_eq!(amount.to_string(), "10000.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Creates a new `Money` from a `Decimal`, normalizing to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Money(normalized)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns `true` if this value is strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Applies a percentage rate to this amount: `self * rate / 100`.
    ///
    /// The result is rounded back to 2 decimal places.
    pub fn percent(&self, rate: Money) -> Money {
        Money::new(self.0 * rate.0 / Decimal::ONE_HUNDRED)
    }

    /// Returns the greater of this amount and zero.
    pub fn clamp_to_zero(&self) -> Money {
        if self.is_negative() {
            Money::ZERO
        } else {
            *self
        }
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money::new(Decimal::from(value))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money::new(-self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Ledger documents written by the original tool store plain JSON
        // numbers, so emit a number rather than a string. Whole amounts go
        // out as integers, which stay exact across the full mantissa range;
        // fractional amounts go through f64 only when the round trip is
        // exact, so precision loss is an error rather than silent.
        if self.0.fract().is_zero() {
            let value = self
                .0
                .to_i128()
                .ok_or_else(|| serde::ser::Error::custom("amount out of range"))?;
            return serializer.serialize_i128(value);
        }

        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("amount out of range"))?;
        let exact = Decimal::try_from(value)
            .map(|decimal| Money::new(decimal) == *self)
            .unwrap_or(false);
        if !exact {
            return Err(serde::ser::Error::custom(
                "amount cannot be represented exactly as a number",
            ));
        }
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept both JSON numbers (existing saved data) and strings.
        // Integers are matched before floats so large whole amounts never
        // take a lossy trip through f64.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Unsigned(n) => Ok(Money::new(Decimal::from(n))),
            Repr::Signed(n) => Ok(Money::new(Decimal::from(n))),
            Repr::Float(n) => {
                let decimal = Decimal::try_from(n).map_err(serde::de::Error::custom)?;
                Ok(Money::new(decimal))
            }
            Repr::Text(s) => Money::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_normalizes_scale() {
        let m = Money::from_str("1.0").unwrap();
        assert_eq!(m.to_string(), "1.00");

        let m = Money::from_str("10000").unwrap();
        assert_eq!(m.to_string(), "10000.00");

        let m = Money::from_str("1.25").unwrap();
        assert_eq!(m.to_string(), "1.25");

        let m = Money::from_str("  2.5  ").unwrap();
        assert_eq!(m.to_string(), "2.50");
    }

    #[test]
    fn test_arithmetic_preserves_scale() {
        let a = Money::from_str("1.5").unwrap();
        let b = Money::from_str("2.5").unwrap();

        assert_eq!((a + b).to_string(), "4.00");
        assert_eq!((b - a).to_string(), "1.00");
    }

    #[test]
    fn test_percent() {
        let capital = Money::from(10000);
        let rate = Money::from(5);
        assert_eq!(capital.percent(rate), Money::from(500));

        let odd = Money::from_str("333.33").unwrap();
        assert_eq!(odd.percent(rate).to_string(), "16.67");
    }

    #[test]
    fn test_negative_values() {
        let positive = Money::from(1);
        let negative = Money::from(-1);

        assert!(negative.is_negative());
        assert!(!positive.is_negative());
        assert_eq!((positive - negative).to_string(), "2.00");
        assert_eq!((-positive).to_string(), "-1.00");
        assert_eq!(negative.clamp_to_zero(), Money::ZERO);
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("10000").unwrap();
        assert_eq!(from_number, Money::from(10000));

        let from_float: Money = serde_json::from_str("250.5").unwrap();
        assert_eq!(from_float.to_string(), "250.50");

        let from_string: Money = serde_json::from_str("\"250.50\"").unwrap();
        assert_eq!(from_string, from_float);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_str("250.50").unwrap()).unwrap();
        assert_eq!(json, "250.5");

        let json = serde_json::to_string(&Money::from(10000)).unwrap();
        assert_eq!(json, "10000");
    }

    #[test]
    fn test_large_whole_amounts_round_trip_exactly() {
        // Beyond f64's 53-bit integer range; must not go through a float.
        let amount = Money::from_str("90071992547409929").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "90071992547409929");

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_inexact_fractional_amount_fails_loudly() {
        // A fractional amount this wide has no exact f64 representation;
        // serialization must error rather than silently round.
        let amount = Money::from_str("90071992547409929.25").unwrap();
        assert!(serde_json::to_string(&amount).is_err());
    }
}
