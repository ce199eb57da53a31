//! Credential checks and token issuance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use gisthub_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use gisthub_auth::password::{PasswordHasher, PasswordValidator};
use gisthub_core::error::AppError;
use gisthub_database::store::UserStore;
use gisthub_entity::user::{CreateUser, User, UserRole};

use crate::context::RequestContext;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A signed-in user with a fresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Fields accepted at registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: Option<String>,
}

/// Registers users and issues, refreshes, and revokes tokens.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
            decoder,
        }
    }

    /// Creates a member account and signs it in.
    pub async fn register(&self, req: Registration) -> Result<AuthSession, AppError> {
        self.validator
            .validate("password", &req.password, &req.confirm_password)?;

        let email = normalize_email(&req.email);
        let password_hash = self.hasher.hash_password(&req.password)?;
        let display_name = req
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let user = self
            .users
            .create(&CreateUser {
                email,
                password_hash: Some(password_hash),
                display_name,
                role: UserRole::Member,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        self.issue(user, None)
    }

    /// Checks credentials and issues a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        // Provider-linked accounts have no password to check against.
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };
        if !self.hasher.verify_password(password, hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "User logged in");
        self.issue(user, None)
    }

    /// Exchanges a refresh token for a new pair and revokes the old one.
    ///
    /// The role is re-read from the store so role changes apply on refresh.
    /// A refresh token is redeemable once, even under concurrent requests.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let claims = self.decoder.decode_refresh_token(refresh_token).await?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;

        self.decoder.consume(&claims).await?;
        self.issue(user, claims.impersonated_by)
    }

    /// Revokes the access token behind `ctx` and, when given, a refresh token.
    pub async fn logout(
        &self,
        ctx: &RequestContext,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        if let (Some(jti), Some(expires_at)) = (ctx.token_id, ctx.token_expires_at) {
            self.decoder.revoke_id(jti, expires_at).await?;
        }
        if let Some(token) = refresh_token {
            match self.decoder.decode_refresh_token(token).await {
                Ok(claims) if claims.sub == ctx.user_id => self.decoder.revoke(&claims).await?,
                Ok(_) => warn!(user_id = %ctx.user_id, "Ignoring refresh token of another user"),
                Err(e) => warn!(user_id = %ctx.user_id, error = %e, "Ignoring invalid refresh token"),
            }
        }

        info!(user_id = %ctx.user_id, "User logged out");
        Ok(())
    }

    /// The current user.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Issues a token pair for `user`. Used for sign-in and impersonation.
    pub fn issue(
        &self,
        user: User,
        impersonated_by: Option<Uuid>,
    ) -> Result<AuthSession, AppError> {
        let tokens = self.encoder.generate_token_pair(&user, impersonated_by)?;
        Ok(AuthSession { user, tokens })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
