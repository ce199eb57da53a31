//! User self-service operations: display name and password changes.

use std::sync::Arc;

use tracing::info;

use gisthub_auth::password::{PasswordHasher, PasswordValidator};
use gisthub_core::error::AppError;
use gisthub_database::store::UserStore;
use gisthub_entity::user::User;

use crate::context::RequestContext;

/// Minimum display name length in characters.
pub const MIN_NAME_LENGTH: usize = 2;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
        }
    }

    /// Gets the current user's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Sets the current user's display name.
    pub async fn update_name(&self, ctx: &RequestContext, name: &str) -> Result<User, AppError> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(AppError::invalid_field(
                "name",
                format!("Name must be at least {MIN_NAME_LENGTH} characters"),
            ));
        }

        let user = self.users.update_display_name(ctx.user_id, name).await?;
        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }

    /// Changes the current user's password after checking the current one.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        let user = self.get_profile(ctx).await?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AppError::invalid_field(
                "current_password",
                "This account has no password set",
            ));
        };
        if !self.hasher.verify_password(current_password, hash)? {
            return Err(AppError::invalid_field(
                "current_password",
                "Current password is incorrect",
            ));
        }

        self.validator
            .validate("new_password", new_password, confirm_password)?;

        let new_hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(ctx.user_id, &new_hash).await?;

        info!(user_id = %ctx.user_id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Registration;
    use crate::testing::Fixture;
    use gisthub_core::ErrorKind;

    #[tokio::test]
    async fn test_update_name() {
        let fx = Fixture::new();
        let alice = fx.member("alice@example.com").await;
        let users = fx.user_service();

        let err = users.update_name(&alice, " a ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Name must be at least 2 characters");

        let user = users.update_name(&alice, "Alice L.").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Alice L."));
    }

    #[tokio::test]
    async fn test_change_password() {
        let fx = Fixture::new();
        let accounts = fx.account_service();
        let session = accounts
            .register(Registration {
                email: "bob@example.com".into(),
                password: "first-pass".into(),
                confirm_password: "first-pass".into(),
                name: None,
            })
            .await
            .unwrap();
        let ctx = RequestContext::new(session.user.id, session.user.role, "bob@example.com");
        let users = fx.user_service();

        let err = users
            .change_password(&ctx, "wrong-pass", "second-pass", "second-pass")
            .await
            .unwrap_err();
        assert!(err.details.unwrap().get("current_password").is_some());

        let err = users
            .change_password(&ctx, "first-pass", "second-pass", "other-pass")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        users
            .change_password(&ctx, "first-pass", "second-pass", "second-pass")
            .await
            .unwrap();
        assert!(accounts.login("bob@example.com", "second-pass").await.is_ok());
        assert!(accounts.login("bob@example.com", "first-pass").await.is_err());
    }
}
