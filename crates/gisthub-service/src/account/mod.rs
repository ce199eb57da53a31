//! Account lifecycle: registration, sign-in, token refresh, sign-out.

pub mod service;

pub use service::{AccountService, AuthSession, Registration};
