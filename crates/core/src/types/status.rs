//! Status enums for various entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a status from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0}")]
pub struct ParseStatusError(String);

/// Order lifecycle status.
///
/// Checkout writes `Completed` directly: an order only exists once its
/// transaction has committed. `Pending` and `Cancelled` are reserved for
/// administrative tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}
