//! Auth handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use gisthub_core::error::AppError;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, AuthResponse, MeResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let session = state.account_service.register(req.into()).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let session = state
        .account_service
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let session = state.account_service.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/logout
///
/// The body is optional; when it carries a refresh token that token is
/// revoked as well.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let req: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };

    state
        .account_service
        .logout(auth.context(), req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = state.account_service.me(auth.context()).await?;
    Ok(Json(ApiResponse::ok(MeResponse {
        user: user.into(),
        impersonated_by: auth.impersonated_by,
    })))
}
