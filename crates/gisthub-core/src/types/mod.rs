//! Core type definitions used across the GistHub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
