//! Role mutation guard.
//!
//! Every change to an account's role set passes through
//! [`authorize_role_change`] before it is persisted. The guard only cares
//! about `ROOT`: granting or revoking it requires an actor that holds `ROOT`
//! itself. Every other change is left to the ordinary authority checks at the
//! API boundary.
//!
//! # Sharp edge
//!
//! The check fires only when `ROOT` membership *flips*. A change that keeps
//! `ROOT` (present before and after) while adding or removing other roles is
//! not guarded, so an `ADMIN` may rewrite the non-`ROOT` roles of a `ROOT`
//! account as long as `ROOT` itself stays in place.

use crate::error::{CoreError, Result};
use crate::principal::Principal;
use crate::role::{Role, RoleSet};

/// Whether replacing `current` with `proposed` adds or removes `ROOT`.
#[must_use]
pub fn involves_root(current: &RoleSet, proposed: &RoleSet) -> bool {
    proposed.contains(&Role::Root) ^ current.contains(&Role::Root)
}

/// Authorize replacing `current` with `proposed` on behalf of `actor`.
///
/// `actor` is `None` when no authenticated caller is attached, which is only
/// acceptable for changes that leave `ROOT` membership untouched.
///
/// # Errors
///
/// Returns `CoreError::EscalationDenied` if the change adds or removes `ROOT`
/// and `actor` is absent or does not hold `ROOT`.
pub fn authorize_role_change(
    current: &RoleSet,
    proposed: &RoleSet,
    actor: Option<&Principal>,
) -> Result<()> {
    if !involves_root(current, proposed) {
        return Ok(());
    }

    match actor {
        Some(actor) if actor.has_role(Role::Root) => Ok(()),
        _ => Err(CoreError::EscalationDenied),
    }
}
