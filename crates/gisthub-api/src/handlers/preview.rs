//! Link-preview handlers: Open Graph PNG cards and the embeddable page.

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use gisthub_service::{EmbedPage, EmbedTheme};

use crate::dto::request::EmbedParams;
use crate::error::ApiError;
use crate::extractors::path::parse_version;
use crate::extractors::{ValidQuery, parse_uuid};
use crate::state::AppState;

const OG_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
const EMBED_CSP: &str = "frame-ancestors *";

/// GET /api/og/{id}
pub async fn og_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let gist_id = parse_uuid(&id)?;
    let png = state.og_service.image(gist_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, OG_CACHE_CONTROL),
        ],
        png,
    )
        .into_response())
}

/// GET /embed/{id}?theme=&version=
///
/// Always answers with HTML. An unknown or private gist gets the
/// "doesn't exist" page with a 404.
pub async fn embed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidQuery(params): ValidQuery<EmbedParams>,
) -> Result<Response, ApiError> {
    let theme = EmbedTheme::parse_or_auto(params.theme.as_deref());
    let version = params
        .version
        .as_deref()
        .and_then(|v| parse_version(v).ok());

    let (page, html) = match Uuid::parse_str(&id) {
        Ok(gist_id) => state.embed_service.render(gist_id, version, theme).await?,
        Err(_) => {
            let page = EmbedPage::Missing;
            let html = page.render(theme, &state.config.server.public_base_url);
            (page, html)
        }
    };

    let status = if page.is_missing() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        [(header::CONTENT_SECURITY_POLICY, EMBED_CSP)],
        Html(html),
    )
        .into_response())
}
