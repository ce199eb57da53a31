//! User domain entities.

pub mod model;
pub mod role;

pub use model::{CreateUser, OwnerSummary, User};
pub use role::UserRole;
