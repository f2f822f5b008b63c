//! Domain types stored in the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::RoleSet;

/// An account record stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable login name.
    pub username: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Whether the account may authenticate.
    pub enabled: bool,
    /// Roles granted to the account.
    pub roles: RoleSet,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record stamped with the current time.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: RoleSet,
        enabled: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            enabled,
            roles,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
