//! # gisthub-api
//!
//! HTTP API layer for GistHub built on Axum.
//!
//! Provides the JSON API, the public raw/embed/preview endpoints,
//! middleware (CORS, logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
