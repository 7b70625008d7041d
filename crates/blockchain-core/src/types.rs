// blockchain-core/src/types.rs

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Block number/height
pub type BlockNumber = u64;

/// Block time, serialized as RFC 3339
pub type Timestamp = DateTime<Utc>;

/// Token amount (using BigUint for arbitrary precision)
///
/// Serialized as a base-10 string so that clients reading the JSON never
/// lose precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    /// Integer part of a non-negative decimal. Returns `None` for negative input.
    pub fn from_decimal_trunc(value: Decimal) -> Option<Amount> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        value.trunc().to_u128().map(|v| Amount(BigUint::from(v)))
    }

    /// Exact decimal representation, `None` when the amount exceeds `Decimal::MAX`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let v = self.0.to_i128()?;
        Decimal::try_from_i128_with_scale(v, 0).ok()
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for Amount {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(self.0 - other.0)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(de::Error::custom)
    }
}

/// Vote tally of a proposal
pub type VoteCount = Amount;

/// Height and time of the block being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: BlockNumber,
    pub time: Timestamp,
}

impl BlockContext {
    pub fn new(height: BlockNumber, time: Timestamp) -> Self {
        Self { height, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_u64(100);
        let b = Amount::from_u64(50);

        let sum = a + b.clone();
        assert_eq!(sum, Amount::from_u64(150));

        let diff = sum.checked_sub(&b).unwrap();
        assert_eq!(diff, Amount::from_u64(100));
    }

    #[test]
    fn test_amount_underflow() {
        let a = Amount::from_u64(50);
        let b = Amount::from_u64(100);

        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let amount: Amount = "123456789012345678901234567890".parse().unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"123456789012345678901234567890\"");

        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_amount_rejects_malformed_json() {
        assert!(serde_json::from_str::<Amount>("\"12a\"").is_err());
        assert!(serde_json::from_str::<Amount>("\"-5\"").is_err());
    }

    #[test]
    fn test_decimal_truncation() {
        let amount = Amount::from_decimal_trunc(Decimal::new(5075, 2)).unwrap();
        assert_eq!(amount, Amount::from_u64(50));

        assert_eq!(Amount::from_decimal_trunc(Decimal::ZERO), Some(Amount::zero()));
        assert!(Amount::from_decimal_trunc(Decimal::new(-1, 2)).is_none());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Amount::from_u64(42).to_decimal(), Some(Decimal::from(42)));

        let huge: Amount = "1000000000000000000000000000000".parse().unwrap();
        assert!(huge.to_decimal().is_none());
    }
}
