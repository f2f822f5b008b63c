//! Login and refresh protocols.

use std::sync::Arc;

use warden_auth::{AuthError, TokenCodec, TokenKind};
use warden_core::Principal;
use warden_store::Store;

use crate::credentials::CredentialVerifier;
use crate::types::{RefreshedToken, TokenPair};

/// Mints tokens for verified credentials and refresh principals.
pub struct Authenticator<S: Store, V: CredentialVerifier> {
    codec: Arc<TokenCodec>,
    store: Arc<S>,
    verifier: V,
}

impl<S: Store, V: CredentialVerifier> Authenticator<S, V> {
    /// Create an authenticator.
    #[must_use]
    pub const fn new(codec: Arc<TokenCodec>, store: Arc<S>, verifier: V) -> Self {
        Self {
            codec,
            store,
            verifier,
        }
    }

    /// Exchange a username and password for an access and refresh token.
    ///
    /// Both tokens carry the same role snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::BadCredentials` for an unknown user, a wrong
    /// password or a disabled account alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let identity = self
            .verifier
            .verify_primary_credentials(username, password)
            .await
            .inspect_err(|e| tracing::warn!(username = %username, error = %e, "Login failed"))?;

        if !identity.enabled {
            tracing::warn!(username = %username, "Login to disabled account");
            return Err(AuthError::BadCredentials);
        }

        let roles = self
            .store
            .get_account(&identity.username)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::BadCredentials)?
            .roles;

        let pair = TokenPair {
            access_token: self
                .codec
                .issue(TokenKind::Access, &identity.username, &roles)?,
            refresh_token: self
                .codec
                .issue(TokenKind::Refresh, &identity.username, &roles)?,
        };

        tracing::info!(username = %identity.username, "Login succeeded");
        Ok(pair)
    }

    /// Mint a new access token for the principal resolved from a refresh
    /// token, carrying the account's current roles.
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account has been deleted
    /// or disabled.
    pub fn refresh(&self, principal: &Principal) -> Result<RefreshedToken, AuthError> {
        let account = self
            .store
            .get_account(principal.username())
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .filter(|account| account.enabled)
            .ok_or(AuthError::AccountNotFound)?;

        let access_token = self
            .codec
            .issue(TokenKind::Access, &account.username, &account.roles)?;

        tracing::debug!(username = %account.username, "Refreshed access token");
        Ok(RefreshedToken { access_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{hash_password, StoreCredentialVerifier};
    use tempfile::TempDir;
    use warden_auth::{AuthConfig, ManualClock};
    use warden_core::{Role, RoleSet};
    use warden_store::{Account, RocksStore};

    const SECRET: &str = "d2FyZGVuLXRlc3Qtc2lnbmluZy1rZXktMDEyMzQ1Njc4OWFiY2RlZg==";

    type TestAuthenticator = Authenticator<RocksStore, StoreCredentialVerifier<RocksStore>>;

    fn setup() -> (TestAuthenticator, Arc<TokenCodec>, Arc<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let clock = Arc::new(ManualClock::at_epoch_seconds(1_700_000_000));
        let codec = Arc::new(TokenCodec::new(&AuthConfig::new(SECRET), clock).unwrap());

        let hash = hash_password("secret").unwrap();
        store
            .insert_account(&Account::new(
                "alice",
                hash.clone(),
                RoleSet::from([Role::User]),
                true,
            ))
            .unwrap();
        store
            .insert_account(&Account::new(
                "dormant",
                hash,
                RoleSet::from([Role::User]),
                false,
            ))
            .unwrap();

        let verifier = StoreCredentialVerifier::new(store.clone());
        let authn = Authenticator::new(codec.clone(), store.clone(), verifier);
        (authn, codec, store, dir)
    }

    #[tokio::test]
    async fn login_mints_both_tokens() {
        let (authn, codec, _store, _dir) = setup();

        let pair = authn.login("alice", "secret").await.unwrap();

        let access = codec.verify(&pair.access_token).unwrap();
        let refresh = codec.verify(&pair.refresh_token).unwrap();
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(access.subject, "alice");
        assert_eq!(access.roles, refresh.roles);
        assert_eq!(access.roles, RoleSet::from([Role::User]));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (authn, _codec, _store, _dir) = setup();

        let wrong = authn.login("alice", "wrong").await.unwrap_err();
        let unknown = authn.login("nobody", "secret").await.unwrap_err();
        let disabled = authn.login("dormant", "secret").await.unwrap_err();

        assert_eq!(wrong, AuthError::BadCredentials);
        assert_eq!(unknown, AuthError::BadCredentials);
        assert_eq!(disabled, AuthError::BadCredentials);
    }

    #[tokio::test]
    async fn refresh_uses_current_roles() {
        let (authn, codec, store, _dir) = setup();
        let principal = Principal::new("alice", RoleSet::from([Role::User]));

        let mut account = store.get_account("alice").unwrap().unwrap();
        account.roles = RoleSet::from([Role::Admin, Role::User]);
        store.put_account(&account).unwrap();

        let refreshed = authn.refresh(&principal).unwrap();
        let token = codec.verify(&refreshed.access_token).unwrap();
        assert_eq!(token.kind, TokenKind::Access);
        assert_eq!(token.roles, RoleSet::from([Role::Admin, Role::User]));
    }

    #[tokio::test]
    async fn refresh_for_deleted_account_fails() {
        let (authn, _codec, store, _dir) = setup();
        let principal = Principal::new("alice", RoleSet::from([Role::User]));
        store.delete_account("alice").unwrap();

        assert_eq!(authn.refresh(&principal), Err(AuthError::AccountNotFound));
    }

    #[tokio::test]
    async fn refresh_for_disabled_account_fails() {
        let (authn, _codec, store, _dir) = setup();
        let principal = Principal::new("alice", RoleSet::from([Role::User]));

        store
            .update_account("alice", |account| {
                account.enabled = false;
                Ok::<_, warden_store::StoreError>(())
            })
            .unwrap();

        assert_eq!(authn.refresh(&principal), Err(AuthError::AccountNotFound));
    }
}
