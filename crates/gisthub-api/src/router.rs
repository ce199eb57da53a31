//! Route definitions for the GistHub HTTP API.
//!
//! JSON routes are mounted under `/api`; the embeddable page lives at
//! `/embed/{id}` so that it can be framed from any origin.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.request_body_limit_bytes;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .merge(gist_routes())
        .merge(public_routes())
        .merge(admin_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(embed_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness, store check, and the language catalogue
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/check", get(handlers::health::check))
        .route("/languages", get(handlers::health::languages))
}

/// Auth endpoints: register, login, refresh, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/users/me/password", put(handlers::user::change_password))
}

/// Owner gist CRUD, versions, favorites, forks, and the raw body
fn gist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/gists",
            get(handlers::gist::list_gists).post(handlers::gist::create_gist),
        )
        .route(
            "/gists/{id}",
            get(handlers::public::raw_gist)
                .put(handlers::gist::update_gist)
                .delete(handlers::gist::delete_gist),
        )
        .route("/gists/{id}/details", get(handlers::gist::get_gist))
        .route("/gists/{id}/versions", get(handlers::gist::list_versions))
        .route("/gists/{id}/versions/{n}", get(handlers::gist::get_version))
        .route("/gists/{id}/favorite", post(handlers::gist::toggle_favorite))
        .route("/gists/{id}/fork", post(handlers::gist::fork_gist))
}

/// Anonymous feed, share-page data, and OG cards
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/gists", get(handlers::public::list_public))
        .route("/public/gists/{id}", get(handlers::public::public_detail))
        .route("/og/{id}", get(handlers::preview::og_image))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/role", put(handlers::admin::change_role))
        .route(
            "/admin/users/{id}/impersonate",
            post(handlers::admin::impersonate),
        )
        .route("/admin/gists", get(handlers::admin::list_gists))
}

/// Embeddable HTML page
fn embed_routes() -> Router<AppState> {
    Router::new().route("/embed/{id}", get(handlers::preview::embed))
}
