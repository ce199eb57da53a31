//! # gisthub-core
//!
//! Core crate for GistHub. Contains the configuration schema,
//! pagination types, the cache provider trait, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other GistHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
