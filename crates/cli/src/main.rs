//! Roost CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! roost-cli migrate
//!
//! # Create a flock
//! roost-cli flock create --name "Barn 2 layers" --start-date 2026-03-01 --initial-count 500
//!
//! # Seed a demo flock with a week of production records
//! roost-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `flock create` - Create flocks
//! - `seed` - Seed the database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "roost-cli")]
#[command(author, version, about = "Roost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage flocks
    Flock {
        #[command(subcommand)]
        action: FlockAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum FlockAction {
    /// Create a new flock
    Create {
        /// Flock display name
        #[arg(short, long)]
        name: String,

        /// Placement date (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: NaiveDate,

        /// Head-count the flock is placed with
        #[arg(short, long)]
        initial_count: i32,
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
        Commands::Flock { action } => match action {
            FlockAction::Create {
                name,
                start_date,
                initial_count,
            } => {
                commands::flock::create(&name, start_date, initial_count).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
