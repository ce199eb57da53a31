//! # gisthub-auth
//!
//! Authentication and authorization for GistHub.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token creation, validation, and revocation
//! - `password`: Argon2id hashing and password policy
//! - `policy`: the single capability check for gist and admin actions

pub mod jwt;
pub mod password;
pub mod policy;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use policy::{Action, PolicyEnforcer, Principal, Resource};
