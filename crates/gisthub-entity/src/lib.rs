//! # gisthub-entity
//!
//! Domain entity models for GistHub. Every struct in this crate is either
//! a database row (deriving `sqlx::FromRow`) or a read view assembled from
//! several rows.

pub mod gist;
pub mod user;
