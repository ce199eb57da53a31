//! Gist domain entities.

pub mod language;
pub mod model;
pub mod version;
pub mod view;

pub use language::{Language, LanguageInfo};
pub use model::{AdminGistFilter, CreateGist, Gist, GistFilter, UpdateGist};
pub use version::GistVersion;
pub use view::{GistDetail, GistListing, GistRef};
