//! Seed the database with demo users and products.
//!
//! # Usage
//!
//! ```bash
//! gm-cli seed --file crates/cli/seed.yaml
//! ```
//!
//! The file is parsed and validated before connecting. Everything is inserted
//! in one transaction; usernames that already exist are skipped.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sqlx::Connection;
use tracing::{error, info, warn};

use golden_market_api::db::{ProductRepository, RepositoryError, UserRepository};
use golden_market_api::models::NewProduct;
use golden_market_core::Coins;

use super::CommandError;

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

/// A user to create with an opening balance.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    #[serde(default)]
    pub balance: Coins,
}

/// Counts reported after seeding.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub users_inserted: usize,
    pub users_skipped: usize,
    pub products_inserted: usize,
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns an error if the YAML is malformed.
pub fn parse(content: &str) -> Result<SeedFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Check a seed file for values the schema would reject.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut usernames = HashSet::new();

    for (i, user) in seed.users.iter().enumerate() {
        if user.username.trim().is_empty() {
            errors.push(format!("users[{i}]: username is empty"));
        } else if !usernames.insert(user.username.as_str()) {
            errors.push(format!("users[{i}]: duplicate username '{}'", user.username));
        }
        if user.balance.is_negative() {
            errors.push(format!("users[{i}]: balance must not be negative"));
        }
    }

    for (i, product) in seed.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("products[{i}]: name is empty"));
        }
        if product.price.is_negative() {
            errors.push(format!("products[{i}] ({}): price must not be negative", product.name));
        }
        if product.stock < 0 {
            errors.push(format!("products[{i}] ({}): stock must not be negative", product.name));
        }
    }

    errors
}

/// Seed users and products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn from_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(CommandError::FileNotFound(file_path.to_string()).into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed = parse(&content)?;

    info!(
        users = seed.users.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Validation(errors.len()).into());
    }

    let pool = super::connect().await?;
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for user in &seed.users {
        // A failed statement aborts the transaction, so probe with a savepoint.
        let mut savepoint = tx.begin().await?;
        match UserRepository
            .create(&mut savepoint, &user.username, user.balance)
            .await
        {
            Ok(account) => {
                savepoint.commit().await?;
                info!(username = %account.username, user_id = %account.id, "Created user");
                summary.users_inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                savepoint.rollback().await?;
                warn!(username = %user.username, "User already exists, skipping");
                summary.users_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    for product in &seed.products {
        let created = ProductRepository.create(&mut tx, product).await?;
        info!(product = %created.name, product_id = %created.id, "Created product");
        summary.products_inserted += 1;
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", summary.users_inserted);
    info!("  Users skipped (already exist): {}", summary.users_skipped);
    info!("  Products inserted: {}", summary.products_inserted);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let seed = parse(
            r"
users:
  - username: alice
    balance: 500
  - username: bob
products:
  - name: Lantern
    price: 30
    stock: 5
  - name: Compass
    description: Points somewhere
    category: tools
    price: 45
    stock: 0
    is_available: false
",
        )
        .unwrap();

        assert_eq!(seed.users.len(), 2);
        assert_eq!(seed.users[0].balance, Coins::new(500));
        assert_eq!(seed.users[1].balance, Coins::ZERO);
        assert_eq!(seed.products.len(), 2);
        assert!(seed.products[0].is_available);
        assert!(!seed.products[1].is_available);
        assert_eq!(seed.products[1].category, "tools");
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_empty_file_sections_default() {
        let seed = parse("users: []").unwrap();
        assert!(seed.products.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let seed = parse(
            r"
users:
  - username: alice
  - username: alice
  - username: ' '
    balance: -5
products:
  - name: Lantern
    price: -1
    stock: -2
",
        )
        .unwrap();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| e.contains("duplicate username 'alice'")));
        assert!(errors.iter().any(|e| e.contains("stock must not be negative")));
    }

    #[test]
    fn test_parse_rejects_missing_price() {
        assert!(parse("products:\n  - name: Lantern\n    stock: 1\n").is_err());
    }

    #[test]
    fn test_seed_sample_is_valid() {
        let seed = parse(include_str!("../../seed.yaml")).unwrap();
        assert!(!seed.users.is_empty());
        assert!(!seed.products.is_empty());
        assert!(validate(&seed).is_empty());
    }
}
