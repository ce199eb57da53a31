//! Gist entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::language::Language;

/// A code snippet owned by one user. Its bodies live in [`super::GistVersion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Gist {
    /// Unique gist identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Title.
    pub title: String,
    /// Language tag.
    pub language: Language,
    /// Whether anyone may read the gist.
    pub is_public: bool,
    /// Gist this one was forked from, if any.
    pub forked_from_id: Option<Uuid>,
    /// How many times this gist has been forked.
    pub forks_count: i32,
    /// When the gist was created.
    pub created_at: DateTime<Utc>,
    /// When the gist was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Gist {
    /// Check if the given user owns this gist.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Data required to create a gist together with its first version.
#[derive(Debug, Clone)]
pub struct CreateGist {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub language: Language,
    pub is_public: bool,
}

/// New metadata and body for an existing gist.
#[derive(Debug, Clone)]
pub struct UpdateGist {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub language: Language,
    pub is_public: bool,
}

/// Filters for a user's own gist list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GistFilter {
    /// Case-insensitive substring matched against the title and every version body.
    pub search: Option<String>,
    /// Exact language match.
    pub language: Option<Language>,
    /// Exact visibility match.
    pub is_public: Option<bool>,
    /// Restrict to gists the user has favorited.
    pub favorites_only: bool,
}

/// Filters for the admin gist browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminGistFilter {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Restrict to one owner.
    pub user_id: Option<Uuid>,
}
