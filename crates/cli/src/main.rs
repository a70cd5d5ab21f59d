//! Rolla CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending database migrations
//! rolla-cli migrate
//!
//! # Check an address against the geocoding API
//! rolla-cli geocode "1 Main St, Toronto, M1M1M1, Canada"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `geocode` - Probe the geocoding API

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rolla-cli")]
#[command(author, version, about = "Rolla CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Validate an address with the geocoding API
    Geocode {
        /// Single-line address, e.g. "1 Main St, Toronto, M1M1M1, Canada"
        address: String,
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
        Commands::Geocode { address } => commands::geocode::run(&address).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_geocode_address() {
        let cli = Cli::try_parse_from(["rolla-cli", "geocode", "1 Main St, Toronto"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Geocode { ref address }) if address == "1 Main St, Toronto"
        ));
    }
}
