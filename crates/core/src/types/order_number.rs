//! Human-facing order numbers.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of an order number (matches the `VARCHAR(20)` column).
pub const MAX_ORDER_NUMBER_LEN: usize = 20;

/// Number of random characters appended to the date stamp.
const SUFFIX_LEN: usize = 9;

/// Crockford base32: no `I`, `L`, `O`, or `U`.
const SUFFIX_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// An order number such as `ORD-261019-7KQ2M9XF4`.
///
/// The date stamp is the UTC creation date (`YYMMDD`); the suffix carries 45
/// random bits from a fresh v4 UUID and fills the column exactly. Uniqueness
/// is enforced by the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a new order number for an order created at `at`.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        // The low bits of a v4 UUID are all random; version and variant sit higher.
        let mut bits = uuid::Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(SUFFIX_LEN);
        for _ in 0..SUFFIX_LEN {
            let index = usize::try_from(bits & 0x1f).unwrap_or_default();
            suffix.push(char::from(SUFFIX_ALPHABET[index]));
            bits >>= 5;
        }
        Self(format!("ORD-{}-{suffix}", at.format("%y%m%d")))
    }

    /// Wrap an order number loaded from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
