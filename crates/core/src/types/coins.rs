//! Virtual currency amounts.
//!
//! Balances, prices, and order totals are whole coins stored as `BIGINT`.
//! Arithmetic is checked: an overflow yields `None` rather than wrapping,
//! so callers decide how to surface it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An amount of coins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Coins(i64);

impl Coins {
    /// Zero coins.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw coin count.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw coin count.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether this amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Subtract an amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(diff) => Some(Self(diff)),
            None => None,
        }
    }

    /// Multiply a unit price by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul_quantity(self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Coins {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Coins> for i64 {
    fn from(amount: Coins) -> Self {
        amount.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Coins {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Coins {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Coins {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
