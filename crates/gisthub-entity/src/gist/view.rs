//! Read views assembled from several rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Gist;
use super::version::GistVersion;
use crate::user::OwnerSummary;

/// Minimal reference to another gist, used for fork lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistRef {
    pub id: Uuid,
    pub title: String,
}

/// One row of a gist list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistListing {
    #[serde(flatten)]
    pub gist: Gist,
    /// Highest-numbered version.
    pub latest_version: Option<GistVersion>,
    /// Number of versions.
    pub version_count: i64,
    /// Whether the viewer has favorited the gist.
    pub is_favorite: bool,
    pub owner: OwnerSummary,
}

/// A gist with its full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistDetail {
    #[serde(flatten)]
    pub gist: Gist,
    /// Versions ordered newest first.
    pub versions: Vec<GistVersion>,
    pub is_favorite: bool,
    pub forked_from: Option<GistRef>,
    pub owner: OwnerSummary,
}

impl GistDetail {
    /// The current revision (highest number).
    pub fn current(&self) -> Option<&GistVersion> {
        self.versions.first()
    }

    /// Find a revision by number.
    pub fn version(&self, number: i32) -> Option<&GistVersion> {
        self.versions.iter().find(|v| v.version == number)
    }
}
