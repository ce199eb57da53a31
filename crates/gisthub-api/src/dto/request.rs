//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use gisthub_entity::gist::Language;
use gisthub_entity::user::UserRole;
use gisthub_service::{AdminGistQuery, GistInput, Registration};

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Must equal `password`.
    #[validate(length(min = 1, message = "Please confirm your password"))]
    pub confirm_password: String,
    /// Display name.
    pub name: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
            name: req.name,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request body. The refresh token is revoked too when supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Display name.
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
    pub confirm_password: String,
}

/// Create or update a gist.
///
/// Title and body limits depend on configuration and are checked by the
/// service layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GistRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub language: Language,
    #[serde(default)]
    pub is_public: bool,
}

impl From<GistRequest> for GistInput {
    fn from(req: GistRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            language: req.language,
            is_public: req.is_public,
        }
    }
}

/// Change a user's role (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

/// `?take=` for the public gist feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicListParams {
    pub take: Option<u64>,
}

/// `?version=` (or `?v=`) for raw bodies. Kept as text so that a
/// non-numeric value is reported as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawParams {
    pub version: Option<String>,
    pub v: Option<String>,
}

impl RawParams {
    /// The requested version, `version` taking precedence over `v`.
    pub fn requested(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.v.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// `?theme=&version=` for the embed page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedParams {
    pub theme: Option<String>,
    pub version: Option<String>,
}

/// Query for the admin gist browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminGistParams {
    pub search: Option<String>,
    pub user_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl From<AdminGistParams> for AdminGistQuery {
    fn from(params: AdminGistParams) -> Self {
        Self {
            search: params.search,
            user_id: params.user_id,
            page: params.page,
            per_page: params.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_bad_email() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "password123".into(),
            confirm_password: "password123".into(),
            name: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_profile_name_minimum() {
        let req = UpdateProfileRequest { name: "A".into() };
        assert!(req.validate().is_err());
        let req = UpdateProfileRequest { name: "Ada".into() };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_raw_params_prefers_version() {
        let params = RawParams {
            version: Some("2".into()),
            v: Some("5".into()),
        };
        assert_eq!(params.requested(), Some("2"));

        let params = RawParams {
            version: None,
            v: Some(" 5 ".into()),
        };
        assert_eq!(params.requested(), Some("5"));

        let params = RawParams {
            version: Some("".into()),
            v: None,
        };
        assert_eq!(params.requested(), None);
    }

    #[test]
    fn test_gist_request_defaults() {
        let req: GistRequest =
            serde_json::from_str(r#"{"title":"T","language":"python"}"#).unwrap();
        assert_eq!(req.body, "");
        assert!(!req.is_public);
        let input = GistInput::from(req);
        assert_eq!(input.language, Language::Python);
    }
}
