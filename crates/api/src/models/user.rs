//! User account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_market_core::{Coins, UserId};

/// A marketplace account and its coin balance.
///
/// The balance is a ledger: checkout debits it only through a conditional
/// decrement, so it never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub balance: Coins,
    pub created_at: DateTime<Utc>,
}
