//! Roles, authorities and the static mapping between them.
//!
//! Roles are coarse identity tiers assigned to accounts. Authorities are the
//! fine-grained capabilities checked at the API boundary. The mapping is a
//! fixed table compiled into the binary; nothing mutates it at runtime.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A set of roles, ordered for deterministic serialization.
pub type RoleSet = BTreeSet<Role>;

/// A set of authorities, ordered for deterministic serialization.
pub type AuthoritySet = BTreeSet<Authority>;

/// Coarse identity tier assigned to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Highest privilege level. Only `ROOT` holders may grant or revoke `ROOT`.
    Root,
    /// Account administration.
    Admin,
    /// Ordinary account holder.
    User,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Root, Self::Admin, Self::User];

    /// The authorities granted by this role.
    #[must_use]
    pub const fn authorities(self) -> &'static [Authority] {
        match self {
            Self::Root => &[Authority::AccountsDelete],
            Self::Admin => &[
                Authority::AccountsCreate,
                Authority::AccountsRead,
                Authority::AccountsUpdate,
            ],
            Self::User => &[Authority::ProfileRead, Authority::ProfileUpdate],
        }
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

/// Fine-grained capability checked at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    /// Read one's own profile.
    ProfileRead,
    /// Change one's own password.
    ProfileUpdate,
    /// Create accounts.
    AccountsCreate,
    /// List and read accounts.
    AccountsRead,
    /// Update accounts, including their roles.
    AccountsUpdate,
    /// Delete accounts.
    AccountsDelete,
}

impl Authority {
    /// All authorities, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ProfileRead,
        Self::ProfileUpdate,
        Self::AccountsCreate,
        Self::AccountsRead,
        Self::AccountsUpdate,
        Self::AccountsDelete,
    ];

    /// Wire name of the authority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProfileRead => "PROFILE_READ",
            Self::ProfileUpdate => "PROFILE_UPDATE",
            Self::AccountsCreate => "ACCOUNTS_CREATE",
            Self::AccountsRead => "ACCOUNTS_READ",
            Self::AccountsUpdate => "ACCOUNTS_UPDATE",
            Self::AccountsDelete => "ACCOUNTS_DELETE",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|authority| authority.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAuthority(s.to_string()))
    }
}

/// Effective authorities of a role set: the union of each role's authorities.
#[must_use]
pub fn authorities_of(roles: &RoleSet) -> AuthoritySet {
    roles
        .iter()
        .flat_map(|role| role.authorities().iter().copied())
        .collect()
}
