//! Golden Market CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gm-cli migrate
//!
//! # Seed users and products from a YAML file
//! gm-cli seed --file crates/cli/seed.yaml
//!
//! # Credit coins to a user
//! gm-cli credit --user 6f1c...e2 --amount 500
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert demo users and products
//! - `credit` - Add coins to a user's balance

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use golden_market_core::{Coins, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Golden Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long, default_value = "crates/cli/seed.yaml")]
        file: String,
    },
    /// Add coins to a user's balance
    Credit {
        /// User ID
        #[arg(short, long)]
        user: UserId,

        /// Number of coins to add
        #[arg(short, long)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::from_file(&file).await?,
        Commands::Credit { user, amount } => {
            commands::credit::run(user, Coins::new(amount)).await?;
        }
    }
    Ok(())
}
