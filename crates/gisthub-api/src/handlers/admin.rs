//! Admin handlers: user management, the all-gists browser, impersonation.

use axum::Json;
use axum::extract::{Path, State};

use gisthub_core::types::pagination::PageResponse;
use gisthub_entity::gist::GistListing;

use crate::dto::request::{AdminGistParams, ChangeRoleRequest};
use crate::dto::response::{ApiResponse, AuthResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidQuery, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.admin_service.list_users(auth.context()).await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let target_id = parse_uuid(&id)?;
    let user = state
        .admin_service
        .change_role(auth.context(), target_id, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// GET /api/admin/gists
pub async fn list_gists(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(params): ValidQuery<AdminGistParams>,
) -> Result<Json<ApiResponse<PageResponse<GistListing>>>, ApiError> {
    let page = state
        .admin_service
        .list_gists(auth.context(), params.into())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/admin/users/{id}/impersonate
pub async fn impersonate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let target_id = parse_uuid(&id)?;
    let session = state
        .admin_service
        .impersonate(auth.context(), target_id)
        .await?;
    Ok(Json(ApiResponse::ok(session.into())))
}
