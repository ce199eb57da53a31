//! The policy function: principal + action + resource -> decision.

use uuid::Uuid;

use gisthub_core::error::AppError;
use gisthub_entity::gist::Gist;
use gisthub_entity::user::UserRole;

/// Message used whenever a gist is hidden from the caller.
pub const GIST_NOT_FOUND: &str = "Gist not found";
/// Message used when a fork source is missing or private.
pub const GIST_NOT_PUBLIC: &str = "Gist not found or is not public";

/// The acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Operations subject to a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Owner-scoped read (edit view, version history).
    ReadOwnedGist,
    /// Anonymous read of a shared gist.
    ReadPublicGist,
    UpdateGist,
    DeleteGist,
    FavoriteGist,
    ForkGist,
    ListUsers,
    ListAllGists,
    ChangeRole,
    Impersonate,
}

/// What the action is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Gist(&'a Gist),
    User(Uuid),
    System,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Hide the target entirely.
    NotFound(&'static str),
    /// A signed-in principal is required.
    Unauthenticated,
    /// The principal is known but not allowed.
    Forbidden(&'static str),
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NotFound(message) => AppError::not_found(message),
            Denial::Unauthenticated => AppError::authentication("Authentication required"),
            Denial::Forbidden(message) => AppError::authorization(message),
        }
    }
}

/// Evaluates capability checks.
#[derive(Debug, Clone, Default)]
pub struct PolicyEnforcer;

impl PolicyEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate without converting to an error.
    pub fn evaluate(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Resource<'_>,
    ) -> Decision {
        match (action, resource) {
            (Action::ReadPublicGist, Resource::Gist(gist)) => {
                allow_if(gist.is_public, Denial::NotFound(GIST_NOT_FOUND))
            }
            (Action::ReadOwnedGist | Action::UpdateGist | Action::DeleteGist, Resource::Gist(gist)) => {
                allow_if(owns(principal, gist), Denial::NotFound(GIST_NOT_FOUND))
            }
            (Action::FavoriteGist, Resource::Gist(gist)) => match principal {
                None => Decision::Deny(Denial::Unauthenticated),
                Some(_) => allow_if(
                    gist.is_public || owns(principal, gist),
                    Denial::NotFound(GIST_NOT_FOUND),
                ),
            },
            (Action::ForkGist, Resource::Gist(gist)) => match principal {
                None => Decision::Deny(Denial::Unauthenticated),
                Some(_) => allow_if(gist.is_public, Denial::NotFound(GIST_NOT_PUBLIC)),
            },
            (Action::ListUsers | Action::ListAllGists, Resource::System) => require_admin(principal),
            (Action::ChangeRole, Resource::User(target)) => {
                match require_admin(principal) {
                    Decision::Allow if principal.is_some_and(|p| p.user_id == target) => {
                        Decision::Deny(Denial::Forbidden("Cannot modify your own role"))
                    }
                    decision => decision,
                }
            }
            (Action::Impersonate, Resource::User(target)) => {
                match require_admin(principal) {
                    Decision::Allow if principal.is_some_and(|p| p.user_id == target) => {
                        Decision::Deny(Denial::Forbidden("Cannot impersonate yourself"))
                    }
                    decision => decision,
                }
            }
            _ => Decision::Deny(Denial::Forbidden("Action not permitted on this resource")),
        }
    }

    /// Check a capability, mapping a denial to the matching [`AppError`].
    pub fn authorize(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Resource<'_>,
    ) -> Result<(), AppError> {
        match self.evaluate(principal, action, resource) {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial.into()),
        }
    }

    /// The error for a gist action whose target does not exist.
    ///
    /// Matches the denial for a hidden gist so callers cannot tell the two apart.
    pub fn missing(&self, action: Action) -> AppError {
        match action {
            Action::ForkGist => AppError::not_found(GIST_NOT_PUBLIC),
            _ => AppError::not_found(GIST_NOT_FOUND),
        }
    }

    /// Boolean form of [`Self::evaluate`].
    pub fn is_allowed(
        &self,
        principal: Option<&Principal>,
        action: Action,
        resource: Resource<'_>,
    ) -> bool {
        self.evaluate(principal, action, resource) == Decision::Allow
    }
}

fn owns(principal: Option<&Principal>, gist: &Gist) -> bool {
    principal.is_some_and(|p| gist.is_owned_by(p.user_id))
}

fn allow_if(condition: bool, denial: Denial) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(denial)
    }
}

fn require_admin(principal: Option<&Principal>) -> Decision {
    match principal {
        None => Decision::Deny(Denial::Unauthenticated),
        Some(p) if p.role.is_admin() => Decision::Allow,
        Some(_) => Decision::Deny(Denial::Forbidden("Admin access required")),
    }
}
