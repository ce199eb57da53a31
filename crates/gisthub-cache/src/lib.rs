//! # gisthub-cache
//!
//! In-process cache for GistHub built on
//! [moka](https://crates.io/crates/moka). It holds revoked token ids and
//! rendered preview images, each entry with its own TTL.

pub mod keys;
pub mod memory;

pub use memory::MemoryCacheProvider;
