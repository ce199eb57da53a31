//! Admin operations: user list, role changes, impersonation, and the
//! all-gists browser.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use gisthub_auth::jwt::JwtEncoder;
use gisthub_auth::policy::{Action, PolicyEnforcer, Principal, Resource};
use gisthub_core::error::AppError;
use gisthub_core::types::pagination::{PageRequest, PageResponse};
use gisthub_database::store::{GistStore, UserStore};
use gisthub_entity::gist::{AdminGistFilter, GistListing};
use gisthub_entity::user::{User, UserRole};

use crate::account::AuthSession;
use crate::context::RequestContext;

/// Page size of the admin gist browser when the client does not send one.
pub const ADMIN_DEFAULT_PAGE_SIZE: u64 = 10;

/// Filters for the admin gist browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGistQuery {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    pub user_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Handles administrative operations.
#[derive(Debug, Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
    gists: Arc<dyn GistStore>,
    encoder: Arc<JwtEncoder>,
    policy: Arc<PolicyEnforcer>,
    max_page_size: u64,
}

impl AdminService {
    /// Creates a new admin service.
    pub fn new(
        users: Arc<dyn UserStore>,
        gists: Arc<dyn GistStore>,
        encoder: Arc<JwtEncoder>,
        policy: Arc<PolicyEnforcer>,
        max_page_size: u64,
    ) -> Self {
        Self {
            users,
            gists,
            encoder,
            policy,
            max_page_size,
        }
    }

    /// All users, ordered by email.
    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        let principal = self.current_principal(ctx).await?;
        self.policy
            .authorize(Some(&principal), Action::ListUsers, Resource::System)?;
        self.users.list_all().await
    }

    /// Changes another user's role.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        target_id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        let principal = self.current_principal(ctx).await?;
        self.policy.authorize(
            Some(&principal),
            Action::ChangeRole,
            Resource::User(target_id),
        )?;

        self.users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let user = self.users.update_role(target_id, role).await?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %target_id,
            role = %role,
            "User role changed"
        );
        Ok(user)
    }

    /// Issues a token pair for `target_id` marked as an impersonation by the caller.
    pub async fn impersonate(
        &self,
        ctx: &RequestContext,
        target_id: Uuid,
    ) -> Result<AuthSession, AppError> {
        let principal = self.current_principal(ctx).await?;
        self.policy.authorize(
            Some(&principal),
            Action::Impersonate,
            Resource::User(target_id),
        )?;

        let user = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let tokens = self.encoder.generate_token_pair(&user, Some(ctx.user_id))?;

        warn!(admin_id = %ctx.user_id, target_id = %target_id, "Admin impersonation started");
        Ok(AuthSession { user, tokens })
    }

    /// Every gist, paginated, with an optional title search and owner filter.
    pub async fn list_gists(
        &self,
        ctx: &RequestContext,
        query: AdminGistQuery,
    ) -> Result<PageResponse<GistListing>, AppError> {
        let principal = self.current_principal(ctx).await?;
        self.policy
            .authorize(Some(&principal), Action::ListAllGists, Resource::System)?;

        let page = PageRequest::bounded(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(ADMIN_DEFAULT_PAGE_SIZE),
            self.max_page_size,
        );
        let filter = AdminGistFilter {
            search: query.search,
            user_id: query.user_id,
        };
        self.gists.list_all(&filter, &page).await
    }

    /// The caller with the role currently stored for them, not the role
    /// their access token was issued with.
    async fn current_principal(&self, ctx: &RequestContext) -> Result<Principal, AppError> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;
        Ok(Principal {
            user_id: user.id,
            role: user.role,
        })
    }
}
