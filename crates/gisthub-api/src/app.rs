//! Application builder: wires stores, cache, auth, and services into an
//! Axum app, and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use gisthub_auth::jwt::{JwtDecoder, JwtEncoder};
use gisthub_auth::password::{PasswordHasher, PasswordValidator};
use gisthub_auth::policy::PolicyEnforcer;
use gisthub_cache::MemoryCacheProvider;
use gisthub_core::config::AppConfig;
use gisthub_core::error::AppError;
use gisthub_core::traits::cache::CacheProvider;
use gisthub_database::store::Stores;
use gisthub_service::{
    AccountService, AdminService, EmbedService, FavoriteService, ForkService, GistReader,
    GistService, OgImageService, SearchService, UserService, VersionService,
};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared state from configuration and connected stores.
pub fn build_state(config: AppConfig, stores: Stores) -> AppState {
    // ── Step 1: Cache ────────────────────────────────────────────
    let cache: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::new(&config.cache));

    // ── Step 2: Auth primitives ──────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&cache)));
    let policy = Arc::new(PolicyEnforcer::new());

    // ── Step 3: Services ─────────────────────────────────────────
    let reader = GistReader::new(
        Arc::clone(&stores.gists),
        Arc::clone(&stores.users),
        Arc::clone(&policy),
    );

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&stores.users),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
    ));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&stores.users),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
    ));
    let admin_service = Arc::new(AdminService::new(
        Arc::clone(&stores.users),
        Arc::clone(&stores.gists),
        Arc::clone(&jwt_encoder),
        Arc::clone(&policy),
        config.gists.max_page_size,
    ));
    let gist_service = Arc::new(GistService::new(
        reader.clone(),
        Arc::clone(&cache),
        config.gists.clone(),
    ));
    let version_service = Arc::new(VersionService::new(reader.clone()));
    let fork_service = Arc::new(ForkService::new(reader.clone()));
    let favorite_service = Arc::new(FavoriteService::new(reader.clone()));
    let search_service = Arc::new(SearchService::new(
        Arc::clone(&stores.gists),
        config.gists.clone(),
    ));
    let og_service = Arc::new(OgImageService::new(
        reader.clone(),
        Arc::clone(&cache),
        Duration::from_secs(config.cache.preview_ttl_seconds),
    ));
    let embed_service = Arc::new(EmbedService::new(
        reader,
        config.server.public_base_url.clone(),
    ));

    AppState {
        config: Arc::new(config),
        stores,
        cache,
        jwt_decoder,
        account_service,
        user_service,
        admin_service,
        gist_service,
        version_service,
        fork_service,
        favorite_service,
        search_service,
        og_service,
        embed_service,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the GistHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, stores: Stores) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(build_state(config, stores));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "GistHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("GistHub server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
