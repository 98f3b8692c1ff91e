//! treefinder-search - native tree lookup service
//!
//! Answers "which native trees grow around this US city" from GBIF
//! occurrence data and persists enriched results per location.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use treefinder_common::config::{ensure_data_dir, load_toml_config, resolve_config_path, resolve_data_dir};
use treefinder_common::logging::init_logging;
use treefinder_search::db::{init_database_pool, SqliteSpeciesStore};
use treefinder_search::rules::RuleSet;
use treefinder_search::services::{
    Collaborators, GbifOccurrenceClient, GbifSpeciesClient, NominatimGeocoder, SearchService,
};
use treefinder_search::AppState;

/// Command-line arguments for treefinder-search
#[derive(Parser, Debug)]
#[command(name = "treefinder-search")]
#[command(about = "Native tree search service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data folder holding the species database
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Listen address, overrides [server] bind
    #[arg(short, long, env = "TREEFINDER_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_toml_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&config.logging.level);

    info!("Starting treefinder-search");
    info!(
        "Version: {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("Config: built-in defaults"),
    }

    let rules = Arc::new(
        RuleSet::load(config.rules.path.as_deref()).context("Failed to load classification rules")?,
    );

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    let db_path = ensure_data_dir(&data_dir).context("Failed to initialize data folder")?;
    info!("Database: {}", db_path.display());

    let pool = init_database_pool(&db_path)
        .await
        .context("Failed to open species database")?;
    info!("Database connection established");

    let collaborators = Collaborators {
        occurrences: Arc::new(
            GbifOccurrenceClient::new(&config.sources, &config.occurrence)
                .context("Failed to build occurrence client")?,
        ),
        details: Arc::new(
            GbifSpeciesClient::new(&config.sources).context("Failed to build species client")?,
        ),
        geocoder: Arc::new(
            NominatimGeocoder::new(&config.sources).context("Failed to build geocoder")?,
        ),
        store: Arc::new(SqliteSpeciesStore::new(pool)),
    };

    let search = Arc::new(SearchService::new(collaborators, rules, &config));
    let app = treefinder_search::build_router(AppState::new(search));

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    info!("Listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
