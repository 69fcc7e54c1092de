//! Credit coins to a user.

use golden_market_api::db::{RepositoryError, UserRepository};
use golden_market_core::{Coins, UserId};

use super::CommandError;

/// Add `amount` coins to a user's balance.
///
/// # Errors
///
/// Returns an error if the amount is not positive, the user does not exist,
/// or the update fails.
pub async fn run(user_id: UserId, amount: Coins) -> Result<(), Box<dyn std::error::Error>> {
    if amount <= Coins::ZERO {
        return Err(CommandError::InvalidAmount(amount.to_string()).into());
    }

    let pool = super::connect().await?;
    let mut conn = pool.acquire().await?;

    match UserRepository
        .credit_balance(&mut conn, user_id, amount)
        .await
    {
        Ok(balance) => {
            tracing::info!(user_id = %user_id, amount = %amount, balance = %balance, "Balance credited");
            Ok(())
        }
        Err(RepositoryError::NotFound) => Err(format!("User not found: {user_id}").into()),
        Err(e) => Err(e.into()),
    }
}
