//! Account service implementation.
//!
//! This module provides the `AccountManager` trait and `AccountService`
//! implementation that handle account CRUD, profiles and password changes.

use std::sync::Arc;

use async_trait::async_trait;
use warden_core::{authorize_role_change, Principal, Role, RoleSet};
use warden_store::{Account, Store, StoreError};

use crate::credentials::{hash_password, hash_password_blocking, verify_password_blocking};
use crate::error::{ControlError, Result};
use crate::types::{
    AccountInfo, ControlConfig, CreateAccountRequest, PasswordUpdateRequest, ProfileInfo,
    UpdateAccountRequest,
};

/// Trait defining account management operations.
///
/// Every operation that changes an account's roles takes the acting
/// principal so the `ROOT` guard can be applied.
#[async_trait]
pub trait AccountManager: Send + Sync {
    // =========================================================================
    // Accounts
    // =========================================================================

    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::AccountNotFound` if the account doesn't exist.
    async fn get_account(&self, username: &str) -> Result<AccountInfo>;

    /// List all accounts.
    async fn list_accounts(&self) -> Result<Vec<AccountInfo>>;

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Validation` if a field is blank or no roles
    /// are given, `ControlError::EscalationDenied` if the account would hold
    /// `ROOT` and `actor` does not, and `ControlError::AccountExists` if the
    /// username is taken.
    async fn create_account(
        &self,
        request: CreateAccountRequest,
        actor: Option<&Principal>,
    ) -> Result<AccountInfo>;

    /// Partially update an account.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::AccountNotFound` if the account doesn't exist
    /// and `ControlError::EscalationDenied` if the change grants or revokes
    /// `ROOT` and `actor` does not hold it.
    async fn update_account(
        &self,
        username: &str,
        request: UpdateAccountRequest,
        actor: Option<&Principal>,
    ) -> Result<AccountInfo>;

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::AccountNotFound` if the account doesn't exist.
    async fn delete_account(&self, username: &str) -> Result<()>;

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get the profile of an account.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::AccountNotFound` if the account doesn't exist.
    async fn profile(&self, username: &str) -> Result<ProfileInfo>;

    /// Change an account's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidPasswordUpdate` if the current password
    /// does not match.
    async fn update_password(&self, username: &str, request: PasswordUpdateRequest) -> Result<()>;
}

/// The main account service implementation.
pub struct AccountService<S: Store> {
    store: Arc<S>,
    config: ControlConfig,
}

impl<S: Store> AccountService<S> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: Arc<S>, config: ControlConfig) -> Self {
        Self { store, config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, ControlConfig::default())
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Apply startup configuration. Seeds the default accounts if enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding fails.
    pub fn initialize(&self) -> Result<()> {
        if self.config.create_default_accounts {
            self.seed_default_accounts()?;
        }
        Ok(())
    }

    /// Create the `root`, `admin` and `user` accounts if they are missing.
    ///
    /// Each account's password equals its username. Existing accounts are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or storage fails.
    pub fn seed_default_accounts(&self) -> Result<()> {
        let defaults = [
            ("root", RoleSet::from([Role::Root, Role::Admin, Role::User])),
            ("admin", RoleSet::from([Role::Admin, Role::User])),
            ("user", RoleSet::from([Role::User])),
        ];

        for (username, roles) in defaults {
            if self.store.get_account(username)?.is_some() {
                continue;
            }

            let account = Account::new(username, hash_password(username)?, roles, true);
            match self.store.insert_account(&account) {
                Ok(()) => tracing::info!(username = %username, "Seeded default account"),
                Err(StoreError::AlreadyExists) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    fn find_account(&self, username: &str) -> Result<Account> {
        self.store
            .get_account(username)?
            .ok_or_else(|| ControlError::AccountNotFound(username.to_string()))
    }

    fn guard_roles(
        target: &str,
        current: &RoleSet,
        proposed: &RoleSet,
        actor: Option<&Principal>,
    ) -> Result<()> {
        authorize_role_change(current, proposed, actor).map_err(|_| {
            tracing::warn!(
                target_account = %target,
                actor = actor.map_or("<anonymous>", Principal::username),
                "ROOT role change denied"
            );
            ControlError::EscalationDenied
        })
    }
}

/// Name the missing account in a store `NotFound`.
fn not_found_as(username: &str, err: ControlError) -> ControlError {
    match err {
        ControlError::Store(StoreError::NotFound) => {
            ControlError::AccountNotFound(username.to_string())
        }
        other => other,
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ControlError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

#[async_trait]
impl<S: Store + 'static> AccountManager for AccountService<S> {
    // =========================================================================
    // Accounts
    // =========================================================================

    async fn get_account(&self, username: &str) -> Result<AccountInfo> {
        Ok(AccountInfo::from(&self.find_account(username)?))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        Ok(self
            .store
            .list_accounts()?
            .iter()
            .map(AccountInfo::from)
            .collect())
    }

    async fn create_account(
        &self,
        request: CreateAccountRequest,
        actor: Option<&Principal>,
    ) -> Result<AccountInfo> {
        require_non_blank("username", &request.username)?;
        require_non_blank("password", &request.password)?;
        if request.roles.is_empty() {
            return Err(ControlError::Validation("roles must not be empty".into()));
        }

        Self::guard_roles(&request.username, &RoleSet::new(), &request.roles, actor)?;

        let account = Account::new(
            request.username,
            hash_password_blocking(&request.password).await?,
            request.roles,
            request.enabled,
        );

        self.store.insert_account(&account).map_err(|e| match e {
            StoreError::AlreadyExists => ControlError::AccountExists(account.username.clone()),
            other => other.into(),
        })?;

        tracing::info!(
            username = %account.username,
            enabled = account.enabled,
            "Created account"
        );

        Ok(AccountInfo::from(&account))
    }

    async fn update_account(
        &self,
        username: &str,
        request: UpdateAccountRequest,
        actor: Option<&Principal>,
    ) -> Result<AccountInfo> {
        let password_hash = match &request.password {
            Some(password) => {
                require_non_blank("password", password)?;
                Some(hash_password_blocking(password).await?)
            }
            None => None,
        };
        let roles = request.roles.filter(|roles| !roles.is_empty());

        // The guard sees the record as committed, not an earlier snapshot.
        let account = self
            .store
            .update_account(username, |account| -> Result<()> {
                if let Some(roles) = &roles {
                    Self::guard_roles(username, &account.roles, roles, actor)?;
                }
                if let Some(hash) = password_hash {
                    account.password_hash = hash;
                }
                if let Some(enabled) = request.enabled {
                    account.enabled = enabled;
                }
                if let Some(roles) = roles {
                    account.roles = roles;
                }
                account.touch();
                Ok(())
            })
            .map_err(|e| not_found_as(username, e))?;

        tracing::info!(username = %username, "Updated account");
        Ok(AccountInfo::from(&account))
    }

    async fn delete_account(&self, username: &str) -> Result<()> {
        self.store.delete_account(username).map_err(|e| match e {
            StoreError::NotFound => ControlError::AccountNotFound(username.to_string()),
            other => other.into(),
        })?;

        tracing::info!(username = %username, "Deleted account");
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    async fn profile(&self, username: &str) -> Result<ProfileInfo> {
        Ok(ProfileInfo::from(&self.find_account(username)?))
    }

    async fn update_password(&self, username: &str, request: PasswordUpdateRequest) -> Result<()> {
        require_non_blank("oldPassword", &request.old_password)?;
        require_non_blank("newPassword", &request.new_password)?;

        let current = self.find_account(username)?;
        if !verify_password_blocking(&request.old_password, &current.password_hash).await? {
            tracing::warn!(username = %username, "Password change with wrong current password");
            return Err(ControlError::InvalidPasswordUpdate);
        }
        let new_hash = hash_password_blocking(&request.new_password).await?;

        // A password changed since the check above invalidates the request.
        self.store
            .update_account(username, |account| -> Result<()> {
                if account.password_hash != current.password_hash {
                    return Err(ControlError::InvalidPasswordUpdate);
                }
                account.password_hash = new_hash;
                account.touch();
                Ok(())
            })
            .map_err(|e| not_found_as(username, e))?;

        tracing::info!(username = %username, "Changed password");
        Ok(())
    }
}
