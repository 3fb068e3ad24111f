//! Monetary amounts stored as integer minor units.
//!
//! Amounts travel over the wire as JSON numbers in major units (`12.5`)
//! and are stored as `BIGINT` cents, so accumulation never drifts.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// Minor units per major unit.
const SCALE: i64 = 100;

/// Largest major-unit value accepted from clients.
const MAX_MAJOR: f64 = 1.0e12;

/// A non-negative amount of money with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// Create from minor units (cents).
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create from a major-unit float, rounding to the nearest cent.
    pub fn from_major(value: f64) -> Result<Self, AppError> {
        if !value.is_finite() {
            return Err(AppError::validation("Amount must be a finite number"));
        }
        if value < 0.0 {
            return Err(AppError::validation("Amount must not be negative"));
        }
        if value > MAX_MAJOR {
            return Err(AppError::validation("Amount is too large"));
        }
        Ok(Self((value * SCALE as f64).round() as i64))
    }

    /// Minor units (cents).
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Major units as a float, for wire formats.
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Whether the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / SCALE, (self.0 % SCALE).abs())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_major(value).map_err(|e| serde::de::Error::custom(e.message))
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}
