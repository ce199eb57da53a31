//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use gisthub_core::config::AppConfig;
use gisthub_core::error::AppError;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let stores = super::connect(config).await?;
            let Some(pool) = stores.pool() else {
                output::print_warning("Nothing to migrate for the in-memory store.");
                return Ok(());
            };

            println!("Running database migrations...");
            gisthub_database::migration::run_migrations(pool).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
