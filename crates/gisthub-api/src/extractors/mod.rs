//! Custom Axum extractors.

pub mod auth;
pub mod path;
pub mod validated;

pub use auth::{AuthUser, MaybeAuthUser};
pub use path::parse_uuid;
pub use validated::{ValidQuery, ValidatedJson};
