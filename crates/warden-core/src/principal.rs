//! The authenticated identity attached to one request.

use crate::error::{CoreError, Result};
use crate::role::{authorities_of, Authority, AuthoritySet, Role, RoleSet};

/// An authenticated principal.
///
/// Built by the authentication gate from the account the token subject
/// resolves to, and passed explicitly to every downstream call that needs to
/// know who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
    roles: RoleSet,
    authorities: AuthoritySet,
}

impl Principal {
    /// Create a principal, deriving its authorities from `roles`.
    #[must_use]
    pub fn new(username: impl Into<String>, roles: RoleSet) -> Self {
        let authorities = authorities_of(&roles);
        Self {
            username: username.into(),
            roles,
            authorities,
        }
    }

    /// The account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The account's roles at resolution time.
    #[must_use]
    pub const fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// The effective authorities.
    #[must_use]
    pub const fn authorities(&self) -> &AuthoritySet {
        &self.authorities
    }

    /// Whether the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the principal holds `authority`.
    #[must_use]
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }

    /// Require `authority`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingAuthority` if the principal lacks it.
    pub fn require(&self, authority: Authority) -> Result<()> {
        if self.has_authority(authority) {
            Ok(())
        } else {
            Err(CoreError::MissingAuthority(authority))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorities_follow_roles() {
        let principal = Principal::new("admin", [Role::Admin, Role::User].into_iter().collect());

        assert_eq!(principal.username(), "admin");
        assert!(principal.has_role(Role::Admin));
        assert!(!principal.has_role(Role::Root));
        assert!(principal.require(Authority::AccountsUpdate).is_ok());
        assert_eq!(
            principal.require(Authority::AccountsDelete),
            Err(CoreError::MissingAuthority(Authority::AccountsDelete))
        );
    }
}
