//! Exact fixed-point decimals used for weighted governance votes.
//!
//! Values are stored as a signed big integer scaled by `10^18`, so parsing and
//! summing weights never touches floating point.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, ops::Add, str::FromStr};
use thiserror::Error;

/// Number of fractional digits carried by a [`Decimal`].
pub const DECIMAL_PRECISION: usize = 18;

/// Upper bound on the bit length of the scaled integer (256 integer bits plus the
/// bits needed for 18 fractional digits).
pub const MAX_DECIMAL_BIT_LEN: u64 = 315;

const PRECISION_MULTIPLIER: u64 = 1_000_000_000_000_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("decimal string is empty")]
    Empty,
    #[error("invalid decimal string: {0}")]
    Invalid(String),
    #[error("invalid decimal length: {0}")]
    InvalidLength(String),
    #[error("value '{value}' exceeds max precision by {excess} decimal places")]
    Precision { value: String, excess: usize },
    #[error("decimal out of range: {0}")]
    OutOfRange(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(BigInt);

impl Decimal {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn one() -> Self {
        Self(BigInt::from(PRECISION_MULTIPLIER))
    }

    pub fn from_integer(value: u64) -> Self {
        Self(BigInt::from(value) * BigInt::from(PRECISION_MULTIPLIER))
    }

    /// The underlying integer, scaled by `10^18`.
    pub fn scaled(&self) -> &BigInt {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(DecimalError::Empty);
        }
        let (negative, unsigned) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        if unsigned.is_empty() {
            return Err(DecimalError::Empty);
        }

        let mut parts = unsigned.split('.');
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();
        if parts.next().is_some() {
            return Err(DecimalError::Invalid(value.to_string()));
        }

        let mut combined = integer.to_string();
        let mut fraction_len = 0;
        if let Some(fraction) = fraction {
            if fraction.is_empty() || integer.is_empty() {
                return Err(DecimalError::InvalidLength(value.to_string()));
            }
            fraction_len = fraction.len();
            combined.push_str(fraction);
        }
        if fraction_len > DECIMAL_PRECISION {
            return Err(DecimalError::Precision {
                value: value.to_string(),
                excess: fraction_len - DECIMAL_PRECISION,
            });
        }
        if !combined.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecimalError::Invalid(value.to_string()));
        }
        combined.extend(std::iter::repeat('0').take(DECIMAL_PRECISION - fraction_len));

        let magnitude = BigUint::parse_bytes(combined.as_bytes(), 10)
            .ok_or_else(|| DecimalError::Invalid(value.to_string()))?;
        if magnitude.bits() > MAX_DECIMAL_BIT_LEN {
            return Err(DecimalError::OutOfRange(value.to_string()));
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(Self(BigInt::from_biguint(sign, magnitude)))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.magnitude().to_string();
        let padded = if digits.len() <= DECIMAL_PRECISION {
            format!("{digits:0>width$}", width = DECIMAL_PRECISION + 1)
        } else {
            digits
        };
        let split = padded.len() - DECIMAL_PRECISION;
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{}.{}", &padded[..split], &padded[split..])
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Decimal> for Decimal {
    type Output = Decimal;

    fn add(self, rhs: &'a Decimal) -> Decimal {
        Decimal(self.0 + &rhs.0)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_with_full_precision() {
        let weight: Decimal = "0.7".parse().expect("valid decimal");
        assert_eq!(weight.to_string(), "0.700000000000000000");

        let whole: Decimal = "12".parse().expect("valid decimal");
        assert_eq!(whole, Decimal::from_integer(12));
        assert_eq!(whole.to_string(), "12.000000000000000000");

        let negative: Decimal = "-0.000000000000000001".parse().expect("valid decimal");
        assert!(negative.is_negative());
        assert_eq!(negative.to_string(), "-0.000000000000000001");
    }

    #[test]
    fn sums_exactly() {
        let a: Decimal = "0.7".parse().expect("valid");
        let b: Decimal = "0.3".parse().expect("valid");
        assert_eq!(a + b, Decimal::one());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!("".parse::<Decimal>(), Err(DecimalError::Empty));
        assert_eq!("-".parse::<Decimal>(), Err(DecimalError::Empty));
        assert!(matches!(
            "1.".parse::<Decimal>(),
            Err(DecimalError::InvalidLength(_))
        ));
        assert!(matches!(
            ".5".parse::<Decimal>(),
            Err(DecimalError::InvalidLength(_))
        ));
        assert!(matches!(
            "1.2.3".parse::<Decimal>(),
            Err(DecimalError::Invalid(_))
        ));
        assert!(matches!(
            "abc".parse::<Decimal>(),
            Err(DecimalError::Invalid(_))
        ));
        assert!(matches!(
            "+1".parse::<Decimal>(),
            Err(DecimalError::Invalid(_))
        ));
        assert!(matches!(
            "0.1234567890123456789".parse::<Decimal>(),
            Err(DecimalError::Precision { excess: 1, .. })
        ));
    }

    #[test]
    fn rejects_values_beyond_bit_limit() {
        let huge = "9".repeat(100);
        assert!(matches!(
            huge.parse::<Decimal>(),
            Err(DecimalError::OutOfRange(_))
        ));
    }
}
