//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point
//! errors). `Price` is strictly positive, `Quantity` is non-negative;
//! both are checked at construction so downstream balance math never
//! sees a sign violation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// Numeric construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("quantity must be non-negative, got {0}")]
    NegativeQuantity(Decimal),

    #[error("not a decimal number: {0}")]
    Unparseable(String),
}

/// A strictly positive execution or limit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative values
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NonPositivePrice(value));
        }
        Ok(Self(value))
    }

    /// Create a price from a whole number
    ///
    /// # Panics
    /// Panics on zero (test/constructor convenience, mirrors `MarketId::new`)
    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "price must be positive");
        Self(Decimal::from(value))
    }

    /// Parse a price from a decimal string
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value =
            Decimal::from_str(s).map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Get the inner decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Number of significant fractional digits
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order or trade quantity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity, rejecting negative values
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::NegativeQuantity(value));
        }
        Ok(Self(value))
    }

    /// The zero quantity
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Parse a quantity from a decimal string
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value =
            Decimal::from_str(s).map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Get the inner decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check for zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Saturating subtraction; clamps at zero instead of going negative
    pub fn saturating_sub(&self, other: Quantity) -> Quantity {
        if other.0 >= self.0 {
            Quantity::zero()
        } else {
            Quantity(self.0 - other.0)
        }
    }

    /// Number of significant fractional digits
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// saturating_sub never produces a negative quantity, and adding
        /// the subtrahend back never exceeds the original.
        #[test]
        fn prop_saturating_sub_stays_non_negative(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let a = Quantity::try_new(Decimal::from(a)).unwrap();
            let b = Quantity::try_new(Decimal::from(b)).unwrap();
            let diff = a.saturating_sub(b);
            prop_assert!(diff.as_decimal() >= Decimal::ZERO);
            if b <= a {
                prop_assert_eq!(diff + b, a);
            } else {
                prop_assert!(diff.is_zero());
            }
        }

        /// Construction rejects exactly the sign violations.
        #[test]
        fn prop_constructors_enforce_signs(v in -1_000_000i64..1_000_000) {
            let value = Decimal::from(v);
            prop_assert_eq!(Price::try_new(value).is_ok(), value > Decimal::ZERO);
            prop_assert_eq!(Quantity::try_new(value).is_ok(), value >= Decimal::ZERO);
        }
    }
}
