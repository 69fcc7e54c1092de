//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! gm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use golden_market_api::db::MIGRATOR;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Running migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
