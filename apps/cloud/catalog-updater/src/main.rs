//! Catalog Updater
//!
//! A service that refreshes the installed cloud price catalog from
//! configured offer sources. Can run as a one-shot update or as a
//! scheduled cron job.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::PgCatalogRepository;
use eyre::Result;
use tracing::info;

mod config;
mod sources;
mod updater;

use config::Config;
use updater::CatalogUpdater;

#[derive(Parser)]
#[command(name = "catalog-updater")]
#[command(about = "Refresh the installed cloud price catalog from offer sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-time catalog update
    Update {
        /// Cloud providers to update (aws, azure, gcp). Defaults to all.
        #[arg(short, long, value_delimiter = ',')]
        providers: Option<Vec<String>>,

        /// Resource kinds to import (instance, database, storage, ...).
        /// Defaults to all.
        #[arg(short, long, value_delimiter = ',')]
        kinds: Option<Vec<String>>,

        /// Regions to import. Defaults to configured regions.
        #[arg(short = 'R', long, value_delimiter = ',')]
        regions: Option<Vec<String>>,

        /// Overwrite installed rows even when the fetched values are equal
        #[arg(short, long)]
        force: bool,
    },

    /// Run as a scheduled service
    Schedule {
        /// Cron expression for scheduling (default: daily at 03:00)
        #[arg(short, long, default_value = "0 0 3 * * *")]
        cron: String,
    },

    /// Show updater and catalog status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    let environment = Environment::from_env();
    init_tracing(&environment);

    // Initialize metrics
    observability::init_metrics();

    let cli = Cli::parse();

    // Connect to database
    info!("Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;
    database::postgres::run_migrations::<migration::Migrator>(&db, "catalog-updater")
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let updater = Arc::new(CatalogUpdater::new(PgCatalogRepository::new(db), config));

    match cli.command {
        Commands::Update {
            providers,
            kinds,
            regions,
            force,
        } => {
            info!("Starting one-time catalog update");

            let result = updater
                .refresh(
                    providers.as_deref(),
                    kinds.as_deref(),
                    regions.as_deref(),
                    force,
                    "manual",
                )
                .await?;

            info!(
                "Update complete: {} offers fetched, {} prices created, {} updated, {} retired, {} errors",
                result.offers_fetched,
                result.prices_created,
                result.prices_updated,
                result.prices_retired,
                result.errors
            );
        }

        Commands::Schedule { cron } => {
            info!("Starting scheduled updates with cron: {}", cron);
            updater.run_scheduled(&cron).await?;
        }

        Commands::Status => {
            let status = updater.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
