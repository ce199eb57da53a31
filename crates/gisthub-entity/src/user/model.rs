//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique, lower-cased email address.
    pub email: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Argon2 password hash. Absent for accounts linked to an external provider.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// External identity provider name, when linked.
    pub provider: Option<String>,
    /// Account identifier at the external provider.
    #[serde(skip_serializing, default)]
    pub provider_account_id: Option<String>,
    /// User role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name shown next to gists: the display name, or the local part of the email.
    pub fn label(&self) -> String {
        display_label(self.display_name.as_deref(), &self.email)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address, normalized by the caller.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}

/// Public owner information attached to gist listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    /// Owner user id.
    pub id: Uuid,
    /// Display label.
    pub name: String,
}

impl OwnerSummary {
    /// Build from the raw user columns.
    pub fn new(id: Uuid, display_name: Option<&str>, email: &str) -> Self {
        Self {
            id,
            name: display_label(display_name, email),
        }
    }
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.label(),
        }
    }
}

fn display_label(display_name: Option<&str>, email: &str) -> String {
    match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.split('@').next().unwrap_or(email).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_label_falls_back_to_email() {
        let id = Uuid::new_v4();
        assert_eq!(OwnerSummary::new(id, Some("Ada"), "ada@example.com").name, "Ada");
        assert_eq!(OwnerSummary::new(id, Some("  "), "ada@example.com").name, "ada");
        assert_eq!(OwnerSummary::new(id, None, "grace@example.com").name, "grace");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            display_name: None,
            password_hash: Some("$argon2id$secret".into()),
            provider: None,
            provider_account_id: None,
            role: UserRole::Member,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }
}
