//! Password policy enforcement for new passwords.

use gisthub_core::config::AuthConfig;
use gisthub_core::error::{AppError, FieldErrors};

/// Checks new passwords and their confirmation.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a new password and its confirmation.
    ///
    /// `field` names the password field so that errors land on the right
    /// form input (`password` on registration, `new_password` on change).
    pub fn validate(&self, field: &str, password: &str, confirmation: &str) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();

        if password.chars().count() < self.min_length {
            errors.entry(field.to_string()).or_default().push(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if password != confirmation {
            errors
                .entry("confirm_password".to_string())
                .or_default()
                .push("Passwords don't match".to_string());
        }

        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid password".to_string());
        Err(AppError::validation_fields(message, errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_accepts_matching_long_password() {
        assert!(validator().validate("password", "longenough", "longenough").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        let err = validator().validate("password", "short", "short").unwrap_err();
        let details = err.details.unwrap();
        assert!(details["password"][0].as_str().unwrap().contains("at least 8"));
    }

    #[test]
    fn test_rejects_mismatch() {
        let err = validator()
            .validate("new_password", "longenough", "different1")
            .unwrap_err();
        assert_eq!(err.message, "Passwords don't match");
        assert_eq!(err.details.unwrap()["confirm_password"][0], "Passwords don't match");
    }
}
