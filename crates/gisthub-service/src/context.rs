//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gisthub_auth::jwt::Claims;
use gisthub_auth::policy::Principal;
use gisthub_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the auth extractor from access-token claims and passed into
/// service methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The user's email (from token claims).
    pub email: String,
    /// Set when an administrator is acting as this user.
    pub impersonated_by: Option<Uuid>,
    /// Token id of the access token used for this request.
    pub token_id: Option<Uuid>,
    /// Expiry of that access token.
    pub token_expires_at: Option<DateTime<Utc>>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: UserRole, email: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            email: email.into(),
            impersonated_by: None,
            token_id: None,
            token_expires_at: None,
            request_time: Utc::now(),
        }
    }

    /// Builds a context from decoded access-token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email.clone(),
            impersonated_by: claims.impersonated_by,
            token_id: Some(claims.jti),
            token_expires_at: Some(claims.expires_at()),
            request_time: Utc::now(),
        }
    }

    /// The principal handed to the policy enforcer.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
