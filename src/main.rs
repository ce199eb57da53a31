//! GistHub Server: code snippet sharing with version history.
//!
//! Main entry point that loads configuration, connects the store, and
//! starts the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use gisthub_core::config::AppConfig;
use gisthub_core::error::AppError;
use gisthub_database::store::Stores;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `GISTHUB_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("GISTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting GistHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Store connection + migrations ────────────────────
    tracing::info!("Connecting to database...");
    let stores = Stores::connect(&config.database).await?;

    if let Some(pool) = stores.pool() {
        tracing::info!("Running database migrations...");
        gisthub_database::migration::run_migrations(pool).await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 2: HTTP server ──────────────────────────────────────
    gisthub_api::run_server(config, stores).await
}
