//! Health check and catalogue handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use gisthub_core::error::AppError;
use gisthub_entity::gist::{Language, LanguageInfo};

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

fn healthy() -> HealthResponse {
    HealthResponse {
        message: "Healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(healthy()))
}

/// GET /api/check
pub async fn check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    match state.stores.users.health_check().await {
        Ok(true) => Ok(Json(ApiResponse::ok(healthy()))),
        Ok(false) => Err(AppError::service_unavailable("Database unavailable").into()),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            Err(AppError::service_unavailable("Database unavailable").into())
        }
    }
}

/// GET /api/languages
pub async fn languages() -> Json<ApiResponse<Vec<LanguageInfo>>> {
    Json(ApiResponse::ok(Language::catalogue()))
}
