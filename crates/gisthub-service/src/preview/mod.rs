//! Public previews: Open Graph images and iframe embed pages.

pub mod embed;
pub mod glyphs;
pub mod og;

pub use embed::{EmbedPage, EmbedService, EmbedTheme};
pub use og::{OgCard, OgImageService};
