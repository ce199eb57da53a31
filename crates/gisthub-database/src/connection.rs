//! Store backend selection and PostgreSQL pool setup.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use gisthub_core::config::DatabaseConfig;
use gisthub_core::error::{AppError, ErrorKind};

/// URL schemes accepted for PostgreSQL.
const POSTGRES_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

/// Where gists and users are kept, chosen from `database.url`.
#[derive(Debug, Clone)]
pub enum Backend {
    /// `memory://`: an in-process store that lives as long as the server.
    Memory,
    /// A connected PostgreSQL pool.
    Postgres(PgPool),
}

impl Backend {
    /// Open the backend named by the configured URL.
    ///
    /// Unknown schemes are a configuration error rather than a failed
    /// PostgreSQL connection attempt.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, AppError> {
        if config.is_memory() {
            info!(url = %mask_password(&config.url), "Using in-memory store");
            return Ok(Self::Memory);
        }
        if !POSTGRES_SCHEMES.iter().any(|s| config.url.starts_with(s)) {
            return Err(AppError::configuration(format!(
                "Unsupported database URL '{}': expected postgres:// or memory://",
                mask_password(&config.url)
            )));
        }
        connect_postgres(config).await.map(Self::Postgres)
    }
}

async fn connect_postgres(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    info!(
        url = %mask_password(&config.url),
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Hide the password of a database URL for logs and error messages.
fn mask_password(url: &str) -> String {
    let Some(at) = url.find('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at].rfind(':') {
        Some(colon) if colon > scheme_end => {
            format!("{}:****@{}", &url[..colon], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
