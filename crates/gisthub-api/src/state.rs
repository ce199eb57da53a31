//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gisthub_auth::jwt::JwtDecoder;
use gisthub_core::config::AppConfig;
use gisthub_core::traits::cache::CacheProvider;
use gisthub_database::store::Stores;
use gisthub_service::{
    AccountService, AdminService, EmbedService, FavoriteService, ForkService, GistService,
    OgImageService, SearchService, UserService, VersionService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// User and gist stores (PostgreSQL or in-memory)
    pub stores: Stores,
    /// In-process cache (token blocklist, preview images)
    pub cache: Arc<dyn CacheProvider>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    pub account_service: Arc<AccountService>,
    pub user_service: Arc<UserService>,
    pub admin_service: Arc<AdminService>,
    pub gist_service: Arc<GistService>,
    pub version_service: Arc<VersionService>,
    pub fork_service: Arc<ForkService>,
    pub favorite_service: Arc<FavoriteService>,
    pub search_service: Arc<SearchService>,
    pub og_service: Arc<OgImageService>,
    pub embed_service: Arc<EmbedService>,
}
