//! Gist handlers for the signed-in owner: CRUD, versions, favorites, forks.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use gisthub_core::types::pagination::PageResponse;
use gisthub_entity::gist::{GistDetail, GistListing, GistVersion};
use gisthub_service::GistQuery;

use crate::dto::request::GistRequest;
use crate::dto::response::{ApiResponse, FavoriteResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::path::parse_version;
use crate::extractors::{AuthUser, ValidQuery, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/gists
pub async fn list_gists(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(query): ValidQuery<GistQuery>,
) -> Result<Json<ApiResponse<PageResponse<GistListing>>>, ApiError> {
    let page = state.search_service.list(auth.context(), query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/gists
pub async fn create_gist(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<GistRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GistDetail>>), ApiError> {
    let detail = state
        .gist_service
        .create(auth.context(), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
}

/// GET /api/gists/{id}/details
pub async fn get_gist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GistDetail>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let detail = state
        .gist_service
        .get_owned(auth.context(), gist_id)
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// PUT /api/gists/{id}
pub async fn update_gist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<GistRequest>,
) -> Result<Json<ApiResponse<GistDetail>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let detail = state
        .gist_service
        .update(auth.context(), gist_id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// DELETE /api/gists/{id}
pub async fn delete_gist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    state.gist_service.delete(auth.context(), gist_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Gist deleted"))))
}

/// GET /api/gists/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<GistVersion>>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let versions = state
        .version_service
        .list_versions(auth.context(), gist_id)
        .await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// GET /api/gists/{id}/versions/{n}
pub async fn get_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, n)): Path<(String, String)>,
) -> Result<Json<ApiResponse<GistVersion>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let number = parse_version(&n)?;
    let version = state
        .version_service
        .get_version(auth.context(), gist_id, number)
        .await?;
    Ok(Json(ApiResponse::ok(version)))
}

/// POST /api/gists/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let is_favorite = state
        .favorite_service
        .toggle(auth.context(), gist_id)
        .await?;
    Ok(Json(ApiResponse::ok(FavoriteResponse { is_favorite })))
}

/// POST /api/gists/{id}/fork
pub async fn fork_gist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<GistDetail>>), ApiError> {
    let gist_id = parse_uuid(&id)?;
    let detail = state.fork_service.fork(auth.context(), gist_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
}
