//! Capability checks.
//!
//! Every ownership, visibility, and role decision goes through
//! [`PolicyEnforcer::authorize`]; handlers and services never compare
//! roles or owner ids inline.

pub mod enforcer;

pub use enforcer::{
    Action, Decision, Denial, GIST_NOT_FOUND, GIST_NOT_PUBLIC, PolicyEnforcer, Principal, Resource,
};
