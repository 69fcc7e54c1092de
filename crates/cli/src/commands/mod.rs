//! CLI command implementations.

pub mod credit;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Pool size for one-shot CLI commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0} validation errors found")]
    Validation(usize),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Connect to the marketplace database.
///
/// Reads `MARKET_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither variable is set or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("MARKET_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = golden_market_api::db::create_pool(&database_url, CLI_MAX_CONNECTIONS).await?;

    Ok(pool)
}
