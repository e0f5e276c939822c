//! Skybound - terminal flight search
//!
//! Searches one-way flight offers on the Amadeus self-service APIs, with
//! client-side filtering and sorting, from the command line or a TUI.

mod api;
mod auth;
mod config;
mod error;
mod filter;
mod models;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::SortKey;

#[derive(Parser)]
#[command(name = "skybound")]
#[command(about = "Search flight offers from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one-way flight offers
    Search {
        /// Origin, "City (XXX)" or a bare IATA code
        #[arg(short, long)]
        from: String,

        /// Destination, "City (XXX)" or a bare IATA code
        #[arg(short, long)]
        to: String,

        /// Departure date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Number of adult travelers (1-5)
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=5))]
        adults: u8,

        /// Hide offers above this total price
        #[arg(long)]
        max_price: Option<f64>,

        /// Only show offers with exactly this many stops
        #[arg(long)]
        stops: Option<u32>,

        /// Only show these airlines (repeatable)
        #[arg(long = "airline")]
        airlines: Vec<String>,

        /// Result order: cheapest or fastest
        #[arg(short, long, default_value = "cheapest")]
        sort: SortKey,
    },

    /// Look up airports and cities by keyword
    Locations {
        /// City, airport name or code (at least 2 characters)
        keyword: String,
    },

    /// List the built-in airports, optionally filtered
    Airports {
        /// Case-insensitive match on city, code or name
        query: Option<String>,
    },

    /// Show or store API credentials
    Config {
        /// Amadeus API key
        #[arg(long)]
        client_id: Option<String>,

        /// Amadeus API secret
        #[arg(long)]
        client_secret: Option<String>,
    },

    /// Launch the terminal user interface
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. In TUI mode, lines go to a ring buffer shown in
    // the log pane instead of corrupting the alternate screen.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    let log_buffer = if matches!(cli.command, Commands::Tui) {
        let buffer = tui::LogBuffer::new();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(buffer.clone()),
            )
            .init();
        Some(buffer)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
        None
    };

    match cli.command {
        Commands::Search {
            from,
            to,
            date,
            adults,
            max_price,
            stops,
            airlines,
            sort,
        } => {
            let date = api::parse_date(&date)?;
            api::search(api::SearchArgs {
                from,
                to,
                date,
                adults,
                max_price,
                stops,
                airlines,
                sort,
            })
            .await?;
        }
        Commands::Locations { keyword } => {
            api::lookup_locations(&keyword).await?;
        }
        Commands::Airports { query } => {
            api::list_airports(query.as_deref())?;
        }
        Commands::Config {
            client_id,
            client_secret,
        } => {
            if client_id.is_none() && client_secret.is_none() {
                config::status()?;
            } else {
                config::set_credentials(client_id, client_secret)?;
            }
        }
        Commands::Tui => {
            let config = config::Config::load()?;
            tui::run(config, log_buffer.unwrap_or_default()).await?;
        }
    }

    Ok(())
}
