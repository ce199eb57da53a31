//! User profile and admin user management services.

pub mod admin;
pub mod service;

pub use admin::{AdminGistQuery, AdminService};
pub use service::UserService;
