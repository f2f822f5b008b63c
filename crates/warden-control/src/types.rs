//! Request and response types for authentication and account operations.
//!
//! These types define the JSON contracts exposed by the gateway. Field
//! names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use warden_core::RoleSet;
use warden_store::Account;

/// Configuration for the account service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Seed the `root`, `admin` and `user` accounts on startup.
    #[serde(default)]
    pub create_default_accounts: bool,
}

/// Primary credentials presented at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Tokens minted by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

/// Access token minted by a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    /// Fresh access token.
    pub access_token: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account username.
    pub username: String,
    /// Whether the account may authenticate.
    pub enabled: bool,
    /// Roles granted to the account.
    pub roles: RoleSet,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            enabled: account.enabled,
            roles: account.roles.clone(),
        }
    }
}

/// The caller's own account, as seen through `/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    /// Account username.
    pub username: String,
    /// Roles granted to the account.
    pub roles: RoleSet,
}

impl From<&Account> for ProfileInfo {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            roles: account.roles.clone(),
        }
    }
}

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Unique username.
    pub username: String,
    /// Initial plaintext password.
    pub password: String,
    /// Initial roles. Must not be empty.
    pub roles: RoleSet,
    /// Accounts start disabled unless enabled here.
    #[serde(default)]
    pub enabled: bool,
}

impl CreateAccountRequest {
    /// Create a request for a disabled account.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            roles,
            enabled: false,
        }
    }

    /// Create the account enabled.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }
}

/// Partial update of an account. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    /// New plaintext password.
    #[serde(default)]
    pub password: Option<String>,
    /// New enabled flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Replacement role set. An empty set is ignored.
    #[serde(default)]
    pub roles: Option<RoleSet>,
}

/// Request to change the caller's own password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateRequest {
    /// Current plaintext password.
    pub old_password: String,
    /// Replacement plaintext password.
    pub new_password: String,
}
