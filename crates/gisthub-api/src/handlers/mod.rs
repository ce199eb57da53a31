//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod gist;
pub mod health;
pub mod preview;
pub mod public;
pub mod user;
