//! The fixed set of languages a gist can be tagged with.
//!
//! This enum is the single source of truth: request validation, the
//! `gist_language` Postgres type and the `/api/languages` endpoint all
//! derive from it. Adding a variant requires a matching
//! `ALTER TYPE gist_language ADD VALUE` migration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language tag of a gist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gist_language", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    CSharp,
    Php,
    Ruby,
    Swift,
    Sql,
    Elixir,
}

impl Language {
    /// Every supported language, in presentation order.
    pub const ALL: [Language; 12] = [
        Self::TypeScript,
        Self::JavaScript,
        Self::Python,
        Self::Rust,
        Self::Go,
        Self::Java,
        Self::CSharp,
        Self::Php,
        Self::Ruby,
        Self::Swift,
        Self::Sql,
        Self::Elixir,
    ];

    /// The stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Swift => "swift",
            Self::Sql => "sql",
            Self::Elixir => "elixir",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Python => "Python",
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Java => "Java",
            Self::CSharp => "C#",
            Self::Php => "PHP",
            Self::Ruby => "Ruby",
            Self::Swift => "Swift",
            Self::Sql => "SQL",
            Self::Elixir => "Elixir",
        }
    }

    /// Catalogue entries for clients.
    pub fn catalogue() -> Vec<LanguageInfo> {
        Self::ALL.iter().map(|l| LanguageInfo::from(*l)).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = gisthub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == wanted)
            .ok_or_else(|| {
                gisthub_core::AppError::invalid_field(
                    "language",
                    format!("Unsupported language: '{s}'"),
                )
            })
    }
}

/// A language tag with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Stored tag.
    pub tag: Language,
    /// Human-readable name.
    pub name: String,
}

impl From<Language> for LanguageInfo {
    fn from(language: Language) -> Self {
        Self {
            tag: language,
            name: language.display_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_tags() {
        for language in Language::ALL {
            assert_eq!(language.as_str().parse::<Language>().unwrap(), language);
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.as_str()));
        }
    }

    #[test]
    fn test_rejects_unknown() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert_eq!(err.kind, gisthub_core::ErrorKind::Validation);
        assert!(serde_json::from_str::<Language>("\"cobol\"").is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Language::CSharp.display_name(), "C#");
        assert_eq!(Language::Sql.display_name(), "SQL");
        assert_eq!(Language::catalogue().len(), 12);
    }
}
