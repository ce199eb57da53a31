//! Loads gists through the policy and assembles detail views.

use std::sync::Arc;

use uuid::Uuid;

use gisthub_auth::policy::{Action, PolicyEnforcer, Principal, Resource};
use gisthub_core::error::AppError;
use gisthub_database::store::{GistStore, UserStore};
use gisthub_entity::gist::{Gist, GistDetail, GistRef};
use gisthub_entity::user::OwnerSummary;

/// Shared read path for the gist services.
#[derive(Debug, Clone)]
pub struct GistReader {
    gists: Arc<dyn GistStore>,
    users: Arc<dyn UserStore>,
    policy: Arc<PolicyEnforcer>,
}

impl GistReader {
    /// Creates a new reader.
    pub fn new(
        gists: Arc<dyn GistStore>,
        users: Arc<dyn UserStore>,
        policy: Arc<PolicyEnforcer>,
    ) -> Self {
        Self {
            gists,
            users,
            policy,
        }
    }

    /// Fetches a gist and checks that `principal` may perform `action` on it.
    ///
    /// A missing gist and a denied one produce the same error.
    pub async fn load(
        &self,
        principal: Option<&Principal>,
        gist_id: Uuid,
        action: Action,
    ) -> Result<Gist, AppError> {
        let gist = self
            .gists
            .find_by_id(gist_id)
            .await?
            .ok_or_else(|| self.policy.missing(action))?;

        self.policy
            .authorize(principal, action, Resource::Gist(&gist))?;
        Ok(gist)
    }

    /// Assembles the full view of a gist: versions newest first, owner,
    /// fork source, and the viewer's favorite flag.
    pub async fn detail(&self, gist: Gist, viewer: Option<Uuid>) -> Result<GistDetail, AppError> {
        let versions = self.gists.find_versions(gist.id).await?;

        let is_favorite = match viewer {
            Some(user_id) => self.gists.is_favorite(user_id, gist.id).await?,
            None => false,
        };

        let forked_from = match gist.forked_from_id {
            Some(source_id) => self
                .gists
                .find_by_id(source_id)
                .await?
                .map(|source| GistRef {
                    id: source.id,
                    title: source.title,
                }),
            None => None,
        };

        let owner = self.owner(gist.user_id).await?;

        Ok(GistDetail {
            gist,
            versions,
            is_favorite,
            forked_from,
            owner,
        })
    }

    /// Owner summary for a user id.
    pub async fn owner(&self, user_id: Uuid) -> Result<OwnerSummary, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Gist owner {user_id} is missing")))?;
        Ok(OwnerSummary::from(&user))
    }

    /// The underlying gist store.
    pub fn store(&self) -> &Arc<dyn GistStore> {
        &self.gists
    }

    /// The policy enforcer.
    pub fn policy(&self) -> &PolicyEnforcer {
        &self.policy
    }
}
