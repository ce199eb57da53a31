//! # gisthub-database
//!
//! Store traits for users and gists, their PostgreSQL repositories, an
//! in-process [`MemoryStore`], connection management, and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::Backend;
pub use memory::MemoryStore;
pub use store::{GistStore, Stores, UserStore};
