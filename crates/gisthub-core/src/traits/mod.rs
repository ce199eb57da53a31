//! Core traits defined in `gisthub-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
