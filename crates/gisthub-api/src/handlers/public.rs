//! Anonymous read handlers: the public feed, share-page data, and raw bodies.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gisthub_core::error::ErrorKind;
use gisthub_entity::gist::{GistDetail, GistListing};

use crate::dto::request::{PublicListParams, RawParams};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::path::parse_version;
use crate::extractors::{MaybeAuthUser, ValidQuery, parse_uuid};
use crate::state::AppState;

/// GET /api/public/gists
pub async fn list_public(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<PublicListParams>,
) -> Result<Json<ApiResponse<Vec<GistListing>>>, ApiError> {
    let gists = state.search_service.list_public(params.take).await?;
    Ok(Json(ApiResponse::ok(gists)))
}

/// GET /api/public/gists/{id}
pub async fn public_detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GistDetail>>, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let detail = state
        .gist_service
        .get_public(gist_id, viewer.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/gists/{id}?version={n}
///
/// Plain-text body of a public gist. Not-found answers use the short
/// `{"error": "..."}` body that raw clients expect.
pub async fn raw_gist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidQuery(params): ValidQuery<RawParams>,
) -> Result<Response, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let version = params.requested().map(parse_version).transpose()?;

    match state.version_service.public_body(gist_id, version).await {
        Ok(body) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()),
        Err(e) if e.is(ErrorKind::NotFound) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.message })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}
