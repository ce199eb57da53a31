//! Gist use cases: authoring, version history, forks, favorites, and listings.

pub mod favorite;
pub mod fork;
pub mod input;
pub mod reader;
pub mod search;
pub mod service;
pub mod version;

pub use favorite::FavoriteService;
pub use fork::ForkService;
pub use input::GistInput;
pub use reader::GistReader;
pub use search::{GistQuery, SearchService};
pub use service::GistService;
pub use version::VersionService;
