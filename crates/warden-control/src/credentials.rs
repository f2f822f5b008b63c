//! Password hashing and primary credential verification.
//!
//! Passwords are stored as Argon2id PHC strings with a random salt.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use warden_auth::AuthError;
use warden_store::Store;

use crate::error::{ControlError, Result};

/// Hash a password using Argon2id.
///
/// Returns the PHC string format hash that includes algorithm parameters.
///
/// # Errors
///
/// Returns `ControlError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ControlError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a PHC hash. An unparseable hash never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `ControlError::Internal` if hashing fails or the task is lost.
pub async fn hash_password_blocking(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ControlError::Internal(format!("hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `ControlError::Internal` if the task is lost.
pub async fn verify_password_blocking(password: &str, hash: &str) -> Result<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ControlError::Internal(format!("verification task failed: {e}")))
}

/// Hash verified when the username is unknown, so that both rejection paths
/// cost one Argon2 verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("warden-dummy-password").unwrap_or_default())
}

/// An account whose password has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    /// Account username.
    pub username: String,
    /// Whether the account may be issued tokens.
    pub enabled: bool,
}

/// Verifies a username/password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Check primary credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BadCredentials` for an unknown user or a wrong
    /// password; the two cases are indistinguishable to the caller.
    async fn verify_primary_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<AccountIdentity, AuthError>;
}

/// Verifies credentials against password hashes in the account store.
pub struct StoreCredentialVerifier<S: Store> {
    store: Arc<S>,
}

impl<S: Store> StoreCredentialVerifier<S> {
    /// Create a verifier over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Store + 'static> CredentialVerifier for StoreCredentialVerifier<S> {
    async fn verify_primary_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<AccountIdentity, AuthError> {
        let account = self
            .store
            .get_account(username)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let Some(account) = account else {
            verify_password_blocking(password, dummy_hash())
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            tracing::debug!(username = %username, "Login for unknown account");
            return Err(AuthError::BadCredentials);
        };

        let matches = verify_password_blocking(password, &account.password_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !matches {
            tracing::debug!(username = %username, "Password mismatch");
            return Err(AuthError::BadCredentials);
        }

        Ok(AccountIdentity {
            username: account.username,
            enabled: account.enabled,
        })
    }
}
