//! CLI command definitions and dispatch.

pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use gisthub_core::config::AppConfig;
use gisthub_core::error::AppError;
use gisthub_database::store::Stores;

/// GistHub administration tool
#[derive(Debug, Parser)]
#[command(name = "gisthub-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads config/{env}.toml)
    #[arg(long, env = "GISTHUB_ENV", default_value = "development")]
    pub config_env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config_env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the configured store
pub async fn connect(config: &AppConfig) -> Result<Stores, AppError> {
    if config.database.is_memory() {
        crate::output::print_warning(
            "database.url selects the in-memory store; changes will not persist",
        );
    }
    Stores::connect(&config.database).await
}
