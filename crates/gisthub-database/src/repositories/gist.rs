//! Gist repository implementation.
//!
//! Version numbers are assigned inside the inserting statement
//! (`MAX(version) + 1`) and guarded by the
//! `gist_versions_gist_id_version_key` unique constraint; a collision is
//! retried a bounded number of times.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use gisthub_core::error::AppError;
use gisthub_core::result::AppResult;
use gisthub_core::types::pagination::{PageRequest, PageResponse};
use gisthub_entity::gist::{
    AdminGistFilter, CreateGist, Gist, GistFilter, GistListing, GistVersion, UpdateGist,
};
use gisthub_entity::user::OwnerSummary;

use super::{db_error, is_unique_violation};
use crate::store::GistStore;

const VERSION_UNIQUE_CONSTRAINT: &str = "gist_versions_gist_id_version_key";

/// Attempts made to append a version before reporting a conflict.
const MAX_VERSION_ATTEMPTS: u32 = 3;

const LISTING_SELECT: &str = r#"SELECT g.*,
    u.display_name AS owner_display_name,
    u.email AS owner_email,
    (SELECT COUNT(*) FROM gist_versions cv WHERE cv.gist_id = g.id) AS version_count,
    lv.id AS latest_id,
    lv.version AS latest_number,
    lv.body AS latest_body,
    lv.created_at AS latest_created_at,
    lv.updated_at AS latest_updated_at,
    EXISTS (SELECT 1 FROM favorites f WHERE f.gist_id = g.id AND f.user_id = "#;

const LISTING_FROM: &str = r#") AS is_favorite
FROM gists g
JOIN users u ON u.id = g.user_id
LEFT JOIN LATERAL (
    SELECT id, version, body, created_at, updated_at
    FROM gist_versions
    WHERE gist_id = g.id
    ORDER BY version DESC
    LIMIT 1
) lv ON TRUE
WHERE TRUE"#;

/// Flat row produced by the listing query.
#[derive(Debug, FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    gist: Gist,
    owner_display_name: Option<String>,
    owner_email: String,
    version_count: i64,
    latest_id: Option<Uuid>,
    latest_number: Option<i32>,
    latest_body: Option<String>,
    latest_created_at: Option<DateTime<Utc>>,
    latest_updated_at: Option<DateTime<Utc>>,
    is_favorite: bool,
}

impl From<ListingRow> for GistListing {
    fn from(row: ListingRow) -> Self {
        let latest_version = match (
            row.latest_id,
            row.latest_number,
            row.latest_body,
            row.latest_created_at,
            row.latest_updated_at,
        ) {
            (Some(id), Some(version), Some(body), Some(created_at), Some(updated_at)) => {
                Some(GistVersion {
                    id,
                    gist_id: row.gist.id,
                    version,
                    body,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };
        let owner = OwnerSummary::new(
            row.gist.user_id,
            row.owner_display_name.as_deref(),
            &row.owner_email,
        );
        Self {
            gist: row.gist,
            latest_version,
            version_count: row.version_count,
            is_favorite: row.is_favorite,
            owner,
        }
    }
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern)
}

fn push_owned_filters(qb: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, filter: &GistFilter) {
    qb.push(" AND g.user_id = ").push_bind(owner_id);

    if let Some(pattern) = search_term(filter.search.as_deref()) {
        qb.push(" AND (g.title ILIKE ")
            .push_bind(pattern.clone())
            .push(
                " OR EXISTS (SELECT 1 FROM gist_versions sv WHERE sv.gist_id = g.id AND sv.body ILIKE ",
            )
            .push_bind(pattern)
            .push("))");
    }
    if let Some(language) = filter.language {
        qb.push(" AND g.language = ").push_bind(language);
    }
    if let Some(is_public) = filter.is_public {
        qb.push(" AND g.is_public = ").push_bind(is_public);
    }
    if filter.favorites_only {
        qb.push(" AND EXISTS (SELECT 1 FROM favorites ff WHERE ff.gist_id = g.id AND ff.user_id = ")
            .push_bind(owner_id)
            .push(")");
    }
}

fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AdminGistFilter) {
    if let Some(pattern) = search_term(filter.search.as_deref()) {
        qb.push(" AND g.title ILIKE ").push_bind(pattern);
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND g.user_id = ").push_bind(user_id);
    }
}

fn listing_query<'a>(viewer: Option<Uuid>) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(LISTING_SELECT);
    qb.push_bind(viewer);
    qb.push(LISTING_FROM);
    qb
}

fn push_order_and_page(qb: &mut QueryBuilder<'_, Postgres>, limit: u64, offset: u64) {
    qb.push(" ORDER BY g.updated_at DESC, g.id DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);
}

/// Run `attempt` until it stops colliding on the version number, giving up
/// with a conflict after [`MAX_VERSION_ATTEMPTS`].
async fn retry_version_collisions<T, F, Fut>(gist_id: Uuid, mut attempt: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if is_unique_violation(&e, VERSION_UNIQUE_CONSTRAINT) => {
                if tries >= MAX_VERSION_ATTEMPTS {
                    return Err(AppError::conflict(
                        "The gist was modified concurrently, please retry",
                    ));
                }
                warn!(gist_id = %gist_id, attempt = tries, "Version number collision, retrying");
                tries += 1;
            }
            Err(e) => return Err(db_error("Failed to update gist")(e)),
        }
    }
}

/// Repository for gists, their versions and favorites.
#[derive(Debug, Clone)]
pub struct GistRepository {
    pool: PgPool,
}

impl GistRepository {
    /// Create a new gist repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))
    }

    async fn insert_first_version(
        tx: &mut Transaction<'static, Postgres>,
        gist_id: Uuid,
        body: &str,
    ) -> Result<GistVersion, sqlx::Error> {
        sqlx::query_as::<_, GistVersion>(
            r#"INSERT INTO gist_versions (id, gist_id, version, body)
               VALUES ($1, $2, 1, $3)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(gist_id)
        .bind(body)
        .fetch_one(&mut **tx)
        .await
    }

    /// One attempt at updating metadata and appending the next version.
    async fn try_update_with_version(
        &self,
        data: &UpdateGist,
    ) -> Result<Option<(Gist, GistVersion)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let gist = sqlx::query_as::<_, Gist>(
            r#"UPDATE gists
               SET title = $2, language = $3, is_public = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(data.id)
        .bind(&data.title)
        .bind(data.language)
        .bind(data.is_public)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(gist) = gist else {
            tx.rollback().await?;
            return Ok(None);
        };

        let version = sqlx::query_as::<_, GistVersion>(
            r#"INSERT INTO gist_versions (id, gist_id, version, body)
               SELECT $1, $2, COALESCE(MAX(version), 0) + 1, $3
               FROM gist_versions
               WHERE gist_id = $2
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(data.id)
        .bind(&data.body)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((gist, version)))
    }
}

#[async_trait]
impl GistStore for GistRepository {
    async fn create(&self, data: &CreateGist) -> AppResult<(Gist, GistVersion)> {
        let mut tx = self.begin().await?;

        let gist = sqlx::query_as::<_, Gist>(
            r#"INSERT INTO gists (id, user_id, title, language, is_public)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(&data.title)
        .bind(data.language)
        .bind(data.is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create gist"))?;

        let version = Self::insert_first_version(&mut tx, gist.id, &data.body)
            .await
            .map_err(db_error("Failed to create first version"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit gist creation"))?;
        Ok((gist, version))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Gist>> {
        sqlx::query_as::<_, Gist>("SELECT * FROM gists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find gist"))
    }

    async fn find_versions(&self, gist_id: Uuid) -> AppResult<Vec<GistVersion>> {
        sqlx::query_as::<_, GistVersion>(
            "SELECT * FROM gist_versions WHERE gist_id = $1 ORDER BY version DESC",
        )
        .bind(gist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list versions"))
    }

    async fn find_version(&self, gist_id: Uuid, version: i32) -> AppResult<Option<GistVersion>> {
        sqlx::query_as::<_, GistVersion>(
            "SELECT * FROM gist_versions WHERE gist_id = $1 AND version = $2",
        )
        .bind(gist_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find version"))
    }

    async fn find_latest_version(&self, gist_id: Uuid) -> AppResult<Option<GistVersion>> {
        sqlx::query_as::<_, GistVersion>(
            "SELECT * FROM gist_versions WHERE gist_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(gist_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find latest version"))
    }

    async fn update_with_version(&self, data: &UpdateGist) -> AppResult<(Gist, GistVersion)> {
        retry_version_collisions(data.id, move || self.try_update_with_version(data))
            .await?
            .ok_or_else(|| AppError::not_found("Gist not found"))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM gist_versions WHERE gist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete versions"))?;

        sqlx::query("DELETE FROM favorites WHERE gist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete favorites"))?;

        let result = sqlx::query("DELETE FROM gists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete gist"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit gist deletion"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn fork(&self, source_id: Uuid, owner_id: Uuid) -> AppResult<Option<(Gist, GistVersion)>> {
        let mut tx = self.begin().await?;

        let source = sqlx::query_as::<_, Gist>(
            "SELECT * FROM gists WHERE id = $1 AND is_public FOR UPDATE",
        )
        .bind(source_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to load fork source"))?;

        let Some(source) = source else {
            debug!(source_id = %source_id, "Fork source missing or private");
            return Ok(None);
        };

        let body: Option<String> = sqlx::query_scalar(
            "SELECT body FROM gist_versions WHERE gist_id = $1 ORDER BY version DESC LIMIT 1",
        )
        .bind(source_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to load fork source body"))?;

        let fork = sqlx::query_as::<_, Gist>(
            r#"INSERT INTO gists (id, user_id, title, language, is_public, forked_from_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .bind(&source.title)
        .bind(source.language)
        .bind(source.is_public)
        .bind(source.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create fork"))?;

        let version = Self::insert_first_version(&mut tx, fork.id, body.as_deref().unwrap_or(""))
            .await
            .map_err(db_error("Failed to create fork version"))?;

        sqlx::query("UPDATE gists SET forks_count = forks_count + 1 WHERE id = $1")
            .bind(source_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to increment fork counter"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit fork"))?;
        Ok(Some((fork, version)))
    }

    async fn toggle_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool> {
        let mut tx = self.begin().await?;

        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND gist_id = $2")
            .bind(user_id)
            .bind(gist_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove favorite"))?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO favorites (user_id, gist_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(gist_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to add favorite"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit favorite toggle"))?;
        Ok(removed == 0)
    }

    async fn is_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND gist_id = $2)",
        )
        .bind(user_id)
        .bind(gist_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check favorite"))
    }

    async fn list_owned(
        &self,
        owner_id: Uuid,
        filter: &GistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM gists g WHERE TRUE");
        push_owned_filters(&mut count, owner_id, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count gists"))?;

        let mut query = listing_query(Some(owner_id));
        push_owned_filters(&mut query, owner_id, filter);
        push_order_and_page(&mut query, page.limit(), page.offset());
        let rows = query
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list gists"))?;

        Ok(PageResponse::new(
            rows.into_iter().map(GistListing::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn list_public(&self, limit: u64) -> AppResult<Vec<GistListing>> {
        let mut query = listing_query(None);
        query.push(" AND g.is_public");
        push_order_and_page(&mut query, limit, 0);
        let rows = query
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list public gists"))?;

        Ok(rows.into_iter().map(GistListing::from).collect())
    }

    async fn list_all(
        &self,
        filter: &AdminGistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM gists g WHERE TRUE");
        push_admin_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count gists"))?;

        let mut query = listing_query(None);
        push_admin_filters(&mut query, filter);
        push_order_and_page(&mut query, page.limit(), page.offset());
        let rows = query
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list gists"))?;

        Ok(PageResponse::new(
            rows.into_iter().map(GistListing::from).collect(),
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
