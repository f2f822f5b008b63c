//! Per-request authentication gate.
//!
//! The gate turns an `Authorization` header into an optional [`Principal`]:
//!
//! ```text
//!  header ──▶ Bearer? ──no──▶ anonymous
//!               │yes
//!               ▼
//!            verify ──err──▶ reject
//!               │
//!               ▼
//!     type fits endpoint? ──no──▶ reject
//!               │
//!               ▼
//!     active account? ──no──▶ reject
//!               │
//!               ▼
//!           principal
//! ```
//!
//! `REFRESH` tokens are only accepted on the refresh endpoint and `ACCESS`
//! tokens everywhere else. A disabled account is treated as missing, so
//! disabling an account revokes its outstanding tokens.

use std::sync::Arc;

use warden_auth::{AuthError, TokenCodec, TokenKind};
use warden_core::Principal;
use warden_store::Store;

/// Scheme prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Path suffix identifying the refresh endpoint.
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";

/// Extract the bearer token from an `Authorization` header value.
///
/// Returns `None` if the header is absent or uses another scheme.
#[must_use]
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?.strip_prefix(BEARER_PREFIX)
}

/// Whether `path` addresses the refresh endpoint.
#[must_use]
pub fn is_refresh_endpoint(path: &str) -> bool {
    path.ends_with(REFRESH_ENDPOINT)
}

/// Whether a token of `kind` may be presented on `path`.
#[must_use]
pub fn token_permitted(kind: TokenKind, path: &str) -> bool {
    match kind {
        TokenKind::Refresh => is_refresh_endpoint(path),
        TokenKind::Access => !is_refresh_endpoint(path),
    }
}

/// Resolves the principal for a request.
pub struct AuthGate<S: Store> {
    codec: Arc<TokenCodec>,
    store: Arc<S>,
}

impl<S: Store> AuthGate<S> {
    /// Create a gate.
    #[must_use]
    pub const fn new(codec: Arc<TokenCodec>, store: Arc<S>) -> Self {
        Self { codec, store }
    }

    /// Authenticate a request from its `Authorization` header and path.
    ///
    /// Returns `Ok(None)` when no bearer token is presented and
    /// `Ok(Some(principal))` when a valid token resolves to an active account.
    ///
    /// # Errors
    ///
    /// - Token verification failures from [`TokenCodec::verify`]
    /// - `AuthError::WrongTokenType` if the token type does not fit the path
    /// - `AuthError::AccountNotFound` if the subject is missing or disabled
    /// - `AuthError::Internal` if the account lookup fails
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        path: &str,
    ) -> Result<Option<Principal>, AuthError> {
        let Some(raw) = bearer_token(authorization) else {
            return Ok(None);
        };

        let token = self.codec.verify(raw).inspect_err(|e| {
            tracing::debug!(path = %path, error = %e, "Rejected bearer token");
        })?;

        if !token_permitted(token.kind, path) {
            tracing::debug!(
                subject = %token.subject,
                kind = %token.kind,
                path = %path,
                "Token type not accepted on this endpoint"
            );
            return Err(AuthError::WrongTokenType);
        }

        let account = self
            .store
            .get_account(&token.subject)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .filter(|account| account.enabled)
            .ok_or_else(|| {
                tracing::debug!(subject = %token.subject, "Token subject is not an active account");
                AuthError::AccountNotFound
            })?;

        Ok(Some(Principal::new(account.username, account.roles)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;
    use warden_auth::{AuthConfig, ManualClock};
    use warden_core::{Authority, Role, RoleSet};
    use warden_store::{Account, RocksStore};

    const SECRET: &str = "d2FyZGVuLXRlc3Qtc2lnbmluZy1rZXktMDEyMzQ1Njc4OWFiY2RlZg==";

    struct Fixture {
        gate: AuthGate<RocksStore>,
        codec: Arc<TokenCodec>,
        store: Arc<RocksStore>,
        clock: Arc<ManualClock>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let clock = Arc::new(ManualClock::at_epoch_seconds(1_700_000_000));
        let codec = Arc::new(TokenCodec::new(&AuthConfig::new(SECRET), clock.clone()).unwrap());

        let roles = RoleSet::from([Role::Admin, Role::User]);
        store
            .insert_account(&Account::new("alice", "x", roles, true))
            .unwrap();

        Fixture {
            gate: AuthGate::new(codec.clone(), store.clone()),
            codec,
            store,
            clock,
            _dir: dir,
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn token_type_binding() {
        assert!(token_permitted(TokenKind::Refresh, "/auth/refresh"));
        assert!(token_permitted(TokenKind::Refresh, "/api/auth/refresh"));
        assert!(!token_permitted(TokenKind::Refresh, "/profile"));
        assert!(token_permitted(TokenKind::Access, "/profile"));
        assert!(!token_permitted(TokenKind::Access, "/auth/refresh"));
    }

    #[test]
    fn no_header_is_anonymous() {
        let f = fixture();
        assert_eq!(f.gate.authenticate(None, "/profile"), Ok(None));
        assert_eq!(f.gate.authenticate(Some("Basic Zm9vOmJhcg=="), "/profile"), Ok(None));
    }

    #[test]
    fn access_token_resolves_principal() {
        let f = fixture();
        let token = f
            .codec
            .issue(TokenKind::Access, "alice", &RoleSet::from([Role::User]))
            .unwrap();

        let principal = f
            .gate
            .authenticate(Some(&bearer(&token)), "/profile")
            .unwrap()
            .unwrap();

        assert_eq!(principal.username(), "alice");
        // Roles come from the account, not the token snapshot.
        assert!(principal.has_role(Role::Admin));
        assert!(principal.has_authority(Authority::AccountsRead));
    }

    #[test]
    fn access_token_rejected_on_refresh_endpoint() {
        let f = fixture();
        let token = f
            .codec
            .issue(TokenKind::Access, "alice", &RoleSet::new())
            .unwrap();

        assert_eq!(
            f.gate.authenticate(Some(&bearer(&token)), "/auth/refresh"),
            Err(AuthError::WrongTokenType)
        );
    }

    #[test]
    fn refresh_token_only_on_refresh_endpoint() {
        let f = fixture();
        let token = f
            .codec
            .issue(TokenKind::Refresh, "alice", &RoleSet::new())
            .unwrap();

        assert_eq!(
            f.gate.authenticate(Some(&bearer(&token)), "/profile"),
            Err(AuthError::WrongTokenType)
        );
        assert!(f
            .gate
            .authenticate(Some(&bearer(&token)), "/auth/refresh")
            .unwrap()
            .is_some());
    }

    #[test]
    fn expired_token_rejected() {
        let f = fixture();
        let token = f
            .codec
            .issue(TokenKind::Access, "alice", &RoleSet::new())
            .unwrap();
        f.clock.advance(Duration::seconds(300));

        assert_eq!(
            f.gate.authenticate(Some(&bearer(&token)), "/profile"),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn garbage_token_rejected() {
        let f = fixture();
        assert!(matches!(
            f.gate.authenticate(Some("Bearer nonsense"), "/profile"),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn deleted_or_disabled_account_rejected() {
        let f = fixture();
        let token = f
            .codec
            .issue(TokenKind::Access, "alice", &RoleSet::new())
            .unwrap();
        let header = bearer(&token);

        let mut account = f.store.get_account("alice").unwrap().unwrap();
        account.enabled = false;
        f.store.put_account(&account).unwrap();
        assert_eq!(
            f.gate.authenticate(Some(&header), "/profile"),
            Err(AuthError::AccountNotFound)
        );

        f.store.delete_account("alice").unwrap();
        assert_eq!(
            f.gate.authenticate(Some(&header), "/profile"),
            Err(AuthError::AccountNotFound)
        );
    }
}
