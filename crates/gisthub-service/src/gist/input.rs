//! Author-supplied gist fields and their validation.

use serde::{Deserialize, Serialize};

use gisthub_core::config::GistConfig;
use gisthub_core::error::{AppError, FieldErrors};
use gisthub_entity::gist::Language;

/// Fields sent when creating or updating a gist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistInput {
    pub title: String,
    pub body: String,
    pub language: Language,
    pub is_public: bool,
}

impl GistInput {
    /// Checks the configured limits and returns the input with its title trimmed.
    pub fn validated(mut self, config: &GistConfig) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors
                .entry("title".to_string())
                .or_default()
                .push("Title is required".to_string());
        } else if title.chars().count() > config.max_title_length {
            errors.entry("title".to_string()).or_default().push(format!(
                "Title must be at most {} characters",
                config.max_title_length
            ));
        }

        if self.body.len() > config.max_body_bytes {
            errors.entry("body".to_string()).or_default().push(format!(
                "Body must be at most {} bytes",
                config.max_body_bytes
            ));
        }

        if let Some(first) = errors.values().flatten().next().cloned() {
            return Err(AppError::validation_fields(first, errors));
        }

        self.title = title.to_string();
        Ok(self)
    }
}
