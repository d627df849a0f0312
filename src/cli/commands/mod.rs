//! CLI parser and dispatch to command-specific modules.

mod helpers;
mod hotel;
mod init;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "alpaca")]
#[command(about = "Hotel ingestion and review-driven recommendation worker")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config and SQLITE_DB_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,

    /// Run every stage: catalog, details, ratings, recommendations
    Run,

    /// Fetch the hotel catalog for the configured cities
    Catalog {
        /// City codes to fetch instead of the configured ones
        #[arg(long = "city")]
        cities: Vec<String>,
    },

    /// Fetch search and ratings detail for stored hotels
    Details {
        /// Only fetch search detail
        #[arg(long, conflicts_with = "ratings_only")]
        search_only: bool,
        /// Only fetch ratings detail
        #[arg(long)]
        ratings_only: bool,
    },

    /// Crawl reviews, analyze them and store verdicts
    Recommend {
        /// Process a single hotel instead of all
        #[arg(long)]
        hotel: Option<String>,
    },

    /// Exclude a hotel from automated recommendations, or re-include it
    AdminFlag {
        hotel_id: String,
        /// Set the flag (hotel is skipped)
        #[arg(long, conflicts_with = "enable")]
        disable: bool,
        /// Clear the flag
        #[arg(long)]
        enable: bool,
    },

    /// Show a hotel with its recommendation and reviews
    Show {
        hotel_id: String,
        /// Also list stored reviews
        #[arg(long)]
        reviews: bool,
    },

    /// List hotel IDs on the search denylist
    InvalidIds,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };
    if let Some(db) = &cli.database {
        config.database = Some(db.display().to_string());
    }

    match cli.command {
        Commands::Init => init::cmd_init(&config).await,
        Commands::Run => pipeline::cmd_run(config).await,
        Commands::Catalog { cities } => pipeline::cmd_catalog(config, cities).await,
        Commands::Details {
            search_only,
            ratings_only,
        } => pipeline::cmd_details(config, !ratings_only, !search_only).await,
        Commands::Recommend { hotel } => pipeline::cmd_recommend(config, hotel).await,
        Commands::AdminFlag {
            hotel_id,
            disable,
            enable,
        } => {
            if disable == enable {
                anyhow::bail!("Specify exactly one of --disable or --enable");
            }
            hotel::cmd_admin_flag(&config, &hotel_id, disable).await
        }
        Commands::Show { hotel_id, reviews } => hotel::cmd_show(&config, &hotel_id, reviews).await,
        Commands::InvalidIds => hotel::cmd_invalid_ids(&config).await,
    }
}
