//! Store traits shared by the PostgreSQL repositories and the in-process store.
//!
//! Services depend on `Arc<dyn UserStore>` / `Arc<dyn GistStore>` so that
//! the same business rules run against PostgreSQL in production and
//! against [`MemoryStore`] in development and tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gisthub_core::config::DatabaseConfig;
use gisthub_core::result::AppResult;
use gisthub_core::types::pagination::{PageRequest, PageResponse};
use gisthub_entity::gist::{
    AdminGistFilter, CreateGist, Gist, GistFilter, GistListing, GistVersion, UpdateGist,
};
use gisthub_entity::user::{CreateUser, User, UserRole};

use crate::connection::Backend;
use crate::memory::MemoryStore;
use crate::repositories::gist::GistRepository;
use crate::repositories::user::UserRepository;

/// Persistence operations on users.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a user. Fails with `Conflict` when the email is taken.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Set the display name.
    async fn update_display_name(&self, id: Uuid, display_name: &str) -> AppResult<User>;

    /// Replace the password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Change the role.
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    /// All users ordered by email ascending.
    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Persistence operations on gists, versions and favorites.
///
/// Every multi-row write is atomic: either all rows are written or none.
#[async_trait]
pub trait GistStore: Send + Sync + fmt::Debug + 'static {
    /// Insert a gist and its version 1.
    async fn create(&self, data: &CreateGist) -> AppResult<(Gist, GistVersion)>;

    /// Find a gist by id, regardless of visibility.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Gist>>;

    /// All versions of a gist, newest first.
    async fn find_versions(&self, gist_id: Uuid) -> AppResult<Vec<GistVersion>>;

    /// One version by number.
    async fn find_version(&self, gist_id: Uuid, version: i32) -> AppResult<Option<GistVersion>>;

    /// The highest-numbered version.
    async fn find_latest_version(&self, gist_id: Uuid) -> AppResult<Option<GistVersion>>;

    /// Update metadata in place and append the next version.
    ///
    /// Fails with `NotFound` when the gist does not exist.
    async fn update_with_version(&self, data: &UpdateGist) -> AppResult<(Gist, GistVersion)>;

    /// Delete a gist with its versions and favorites. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Copy a public gist for `owner_id` and bump the source fork counter.
    ///
    /// Returns `None` when the source is missing or not public.
    async fn fork(&self, source_id: Uuid, owner_id: Uuid) -> AppResult<Option<(Gist, GistVersion)>>;

    /// Flip the favorite edge. Returns `true` when the gist is now favorited.
    async fn toggle_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool>;

    /// Whether the favorite edge exists.
    async fn is_favorite(&self, user_id: Uuid, gist_id: Uuid) -> AppResult<bool>;

    /// A user's own gists, filtered and paginated, most recently updated first.
    async fn list_owned(
        &self,
        owner_id: Uuid,
        filter: &GistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>>;

    /// Public gists, most recently updated first, at most `limit`.
    async fn list_public(&self, limit: u64) -> AppResult<Vec<GistListing>>;

    /// Every gist, for administrators.
    async fn list_all(
        &self,
        filter: &AdminGistFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<GistListing>>;
}

/// The pair of stores handed to the service layer.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub gists: Arc<dyn GistStore>,
    pool: Option<PgPool>,
}

impl Stores {
    /// Connect to the backend named by the configured URL.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        Ok(match Backend::open(config).await? {
            Backend::Memory => Self::memory(),
            Backend::Postgres(pool) => Self::postgres(pool),
        })
    }

    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            gists: Arc::new(GistRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Stores backed by a fresh in-process [`MemoryStore`].
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            gists: Arc::new(store),
            pool: None,
        }
    }

    /// The PostgreSQL pool, when connected to one.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}
