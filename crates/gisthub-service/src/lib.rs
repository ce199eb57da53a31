//! # gisthub-service
//!
//! Business logic service layer for GistHub. Each service orchestrates
//! the stores, the cache, and the auth primitives to implement one group
//! of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod context;
pub mod gist;
pub mod preview;
pub mod user;

pub use account::{AccountService, AuthSession, Registration};
pub use context::RequestContext;
pub use gist::{
    FavoriteService, ForkService, GistInput, GistQuery, GistReader, GistService, SearchService,
    VersionService,
};
pub use preview::{EmbedPage, EmbedService, EmbedTheme, OgImageService};
pub use user::{AdminGistQuery, AdminService, UserService};

#[cfg(test)]
pub(crate) mod testing;
