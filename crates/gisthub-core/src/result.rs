//! Convenience result type alias for GistHub.

use crate::error::AppError;

/// A specialized `Result` type for GistHub operations.
pub type AppResult<T> = Result<T, AppError>;
