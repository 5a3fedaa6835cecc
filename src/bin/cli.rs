//! roster-sync CLI
//!
//! Local execution entry point. For AWS Lambda, use `roster-sync-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_sync::{
    config::{self, DEFAULT_CONFIG_PATH},
    error::Result,
    models::{EventReference, OrganizationScope},
    pipeline,
    storage::{self, DocumentStore, paths},
};

/// roster-sync - Competition roster and standings sync
#[derive(Parser, Debug)]
#[command(
    name = "roster-sync",
    version,
    about = "Syncs competition leaderboards into organization member stores"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the standings of a leaderboard page as JSON
    Standings {
        /// Leaderboard URL, fetched as given
        url: String,
    },

    /// Create members for every participant on a roster page
    Seed {
        /// Roster page URL
        #[arg(long)]
        url: String,

        /// Event reference whose organization receives the members
        #[arg(long)]
        event_id: String,
    },

    /// Sync roster and standings of an event into its organization
    Sync {
        /// Event reference (base URL of the event)
        #[arg(long)]
        event_id: String,
    },

    /// Link an event to the organization that owns it
    RegisterEvent {
        #[arg(long)]
        event_id: String,

        #[arg(long)]
        organization: String,
    },

    /// Validate the configuration
    Validate,

    /// Serve the HTTP routes
    #[cfg(feature = "server")]
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
    };
    log::debug!("Loaded configuration from {}", cli.config.display());

    if !cli.verbose {
        match config.logging.level.parse::<log::LevelFilter>() {
            Ok(level) => log::set_max_level(level.min(log::max_level())),
            Err(_) => log::warn!("Ignoring unknown log level '{}'", config.logging.level),
        }
    }

    match cli.command {
        Command::Standings { url } => {
            let ctx = config::build_context(config)?;
            let standings = pipeline::run_fetch_standings(&ctx, &url).await?;
            println!("{}", serde_json::to_string_pretty(&standings)?);
        }

        Command::Seed { url, event_id } => {
            let ctx = config::build_context(config)?;
            let report =
                pipeline::run_seed_roster(&ctx, &url, &EventReference::new(event_id)).await?;
            log::info!(
                "Seed complete: {} created, {} already present",
                report.created,
                report.unchanged
            );
        }

        Command::Sync { event_id } => {
            let ctx = config::build_context(config)?;
            let report = pipeline::run_full_sync(&ctx, &EventReference::new(event_id)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::RegisterEvent {
            event_id,
            organization,
        } => {
            let store = storage::open(&config.store, &config.http)?;
            let event = EventReference::new(event_id);
            let scope = OrganizationScope::new(organization);
            store
                .set(&paths::event(&config.store, &event), scope.event_document())
                .await?;
            log::info!("Event {} now belongs to organization {}", event, scope);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // load_config already validated; selectors are compiled here
            config::build_context(config)?;
            log::info!("✓ Config OK (store settings and selectors)");
        }

        #[cfg(feature = "server")]
        Command::Serve { addr } => {
            let ctx = config::build_context(config)?;
            roster_sync::handlers::server::serve(std::sync::Arc::new(ctx), addr).await?;
        }
    }

    Ok(())
}
