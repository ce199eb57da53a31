//! Gist version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable revision of a gist body.
///
/// Numbers start at 1 and increase by one per update within a gist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GistVersion {
    pub id: Uuid,
    pub gist_id: Uuid,
    pub version: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
