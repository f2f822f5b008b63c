//! Authentication middleware and extractors.
//!
//! The [`gate`] middleware runs on every route. It resolves the bearer
//! token (if any) to a [`Principal`] and stores it in the request
//! extensions; a present-but-invalid token stops the request with `401`.
//!
//! Handlers then pull the principal out with one of two extractors:
//!
//! - [`AuthPrincipal`] requires any authenticated principal
//! - [`Authorized<P>`] additionally requires the authority named by `P`,
//!   one of the markers in [`require`]

use std::marker::PhantomData;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use warden_control::{AccountManager, BEARER_PREFIX};
use warden_core::{Authority, Principal};
use warden_store::Store;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Authentication gate middleware.
///
/// An existing principal in the request extensions is never replaced.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if a bearer token is present but is not
/// valid ASCII, fails verification, has the wrong type for the path, or
/// names an inactive account.
pub async fn gate<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let path = request.uri().path();
    let authorization = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(value) => Some(value),
            // A bearer credential that is not visible ASCII is malformed, not absent.
            Err(_) if value.as_bytes().starts_with(BEARER_PREFIX.as_bytes()) => {
                tracing::warn!(path = %path, "Rejected non-ASCII bearer token");
                return Err(ApiError::Unauthorized);
            }
            Err(_) => None,
        },
    };

    let principal = state
        .gate
        .authenticate(authorization, path)
        .map_err(|e| {
            tracing::warn!(path = %path, error = %e, "Request rejected by authentication gate");
            ApiError::from(e)
        })?;

    if let Some(principal) = principal {
        if request.extensions().get::<Principal>().is_none() {
            request.extensions_mut().insert(principal);
        }
    }

    Ok(next.run(request).await)
}

/// The authenticated principal of the request.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl<St> FromRequestParts<St> for AuthPrincipal
where
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// An authority a route requires.
pub trait RequiredAuthority: Send + Sync + 'static {
    /// The authority.
    const AUTHORITY: Authority;
}

/// The authenticated principal, checked to hold `P::AUTHORITY`.
///
/// Rejects with `401` when there is no principal and `403` when the
/// authority is missing.
#[derive(Debug)]
pub struct Authorized<P: RequiredAuthority> {
    principal: Principal,
    _authority: PhantomData<fn() -> P>,
}

impl<P: RequiredAuthority> Authorized<P> {
    /// The checked principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Consume the extractor and return the principal.
    #[must_use]
    pub fn into_principal(self) -> Principal {
        self.principal
    }
}

#[async_trait]
impl<P, St> FromRequestParts<St> for Authorized<P>
where
    P: RequiredAuthority,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let AuthPrincipal(principal) = AuthPrincipal::from_request_parts(parts, state).await?;

        if principal.require(P::AUTHORITY).is_err() {
            tracing::debug!(
                username = %principal.username(),
                authority = %P::AUTHORITY,
                path = %parts.uri.path(),
                "Missing authority"
            );
            return Err(ApiError::Forbidden);
        }

        Ok(Self {
            principal,
            _authority: PhantomData,
        })
    }
}

/// Marker types naming the authority each route requires.
pub mod require {
    use super::{Authority, RequiredAuthority};

    macro_rules! authority_markers {
        ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl RequiredAuthority for $name {
                    const AUTHORITY: Authority = Authority::$name;
                }
            )*
        };
    }

    authority_markers! {
        /// Requires `PROFILE_READ`.
        ProfileRead,
        /// Requires `PROFILE_UPDATE`.
        ProfileUpdate,
        /// Requires `ACCOUNTS_CREATE`.
        AccountsCreate,
        /// Requires `ACCOUNTS_READ`.
        AccountsRead,
        /// Requires `ACCOUNTS_UPDATE`.
        AccountsUpdate,
        /// Requires `ACCOUNTS_DELETE`.
        AccountsDelete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use warden_core::{Role, RoleSet};

    fn parts_with(principal: Option<Principal>) -> Parts {
        let (mut parts, ()) = HttpRequest::builder()
            .uri("/accounts")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(principal) = principal {
            parts.extensions.insert(principal);
        }
        parts
    }

    #[tokio::test]
    async fn missing_principal_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = AuthPrincipal::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));

        let mut parts = parts_with(None);
        let result =
            Authorized::<require::AccountsRead>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn missing_authority_is_forbidden() {
        let user = Principal::new("user", RoleSet::from([Role::User]));
        let mut parts = parts_with(Some(user));

        let result =
            Authorized::<require::AccountsRead>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[tokio::test]
    async fn held_authority_is_admitted() {
        let admin = Principal::new("admin", RoleSet::from([Role::Admin]));
        let mut parts = parts_with(Some(admin));

        let authorized = Authorized::<require::AccountsUpdate>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(authorized.principal().username(), "admin");
    }

    mod gate_layer {
        use std::sync::Arc;

        use axum::http::{HeaderValue, StatusCode};
        use axum::middleware::{from_fn, from_fn_with_state};
        use axum::routing::get;
        use axum::Router;
        use axum_test::TestServer;
        use tempfile::TempDir;

        use warden_auth::{AuthConfig, ManualClock, TokenCodec, TokenKind};
        use warden_control::AccountService;
        use warden_store::{Account, RocksStore, Store};

        use super::super::*;
        use super::{Role, RoleSet};
        use crate::config::GatewayConfig;

        const SECRET: &str = "d2FyZGVuLXRlc3Qtc2lnbmluZy1rZXktMDEyMzQ1Njc4OWFiY2RlZg==";

        type TestState = GatewayState<RocksStore, AccountService<RocksStore>>;

        async fn whoami(principal: Option<AuthPrincipal>) -> String {
            principal.map_or_else(|| "anonymous".to_string(), |p| p.0.username().to_string())
        }

        async fn preset_principal(mut request: Request, next: Next) -> Response {
            request
                .extensions_mut()
                .insert(Principal::new("preset", RoleSet::from([Role::User])));
            next.run(request).await
        }

        fn setup(preset: bool) -> (TestServer, Arc<TokenCodec>, TempDir) {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(RocksStore::open(dir.path()).unwrap());
            store
                .insert_account(&Account::new("alice", "x", RoleSet::from([Role::User]), true))
                .unwrap();

            let clock = Arc::new(ManualClock::at_epoch_seconds(1_700_000_000));
            let codec = Arc::new(TokenCodec::new(&AuthConfig::new(SECRET), clock).unwrap());
            let accounts = Arc::new(AccountService::with_defaults(store.clone()));
            let state: Arc<TestState> = Arc::new(GatewayState::new(
                store,
                codec.clone(),
                accounts,
                GatewayConfig::default(),
            ));

            let mut app = Router::new()
                .route("/whoami", get(whoami))
                .layer(from_fn_with_state(state, gate::<RocksStore, AccountService<RocksStore>>));
            if preset {
                app = app.layer(from_fn(preset_principal));
            }

            (TestServer::new(app).unwrap(), codec, dir)
        }

        fn bearer(token: &str) -> HeaderValue {
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
        }

        #[tokio::test]
        async fn attaches_token_principal() {
            let (server, codec, _dir) = setup(false);
            let token = codec
                .issue(TokenKind::Access, "alice", &RoleSet::new())
                .unwrap();

            let response = server
                .get("/whoami")
                .add_header(AUTHORIZATION, bearer(&token))
                .await;
            assert_eq!(response.status_code(), StatusCode::OK);
            assert_eq!(response.text(), "alice");

            assert_eq!(server.get("/whoami").await.text(), "anonymous");
        }

        #[tokio::test]
        async fn keeps_existing_principal() {
            let (server, codec, _dir) = setup(true);
            let token = codec
                .issue(TokenKind::Access, "alice", &RoleSet::new())
                .unwrap();

            let response = server
                .get("/whoami")
                .add_header(AUTHORIZATION, bearer(&token))
                .await;
            assert_eq!(response.status_code(), StatusCode::OK);
            assert_eq!(response.text(), "preset");
        }

        #[tokio::test]
        async fn non_ascii_bearer_is_rejected() {
            let (server, _codec, _dir) = setup(false);

            let response = server
                .get("/whoami")
                .add_header(
                    AUTHORIZATION,
                    HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
                )
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn non_ascii_other_scheme_is_anonymous() {
            let (server, _codec, _dir) = setup(false);

            let response = server
                .get("/whoami")
                .add_header(
                    AUTHORIZATION,
                    HeaderValue::from_bytes(b"Basic \xfftoken").unwrap(),
                )
                .await;
            assert_eq!(response.status_code(), StatusCode::OK);
            assert_eq!(response.text(), "anonymous");
        }
    }

    #[test]
    fn markers_name_their_authority() {
        assert_eq!(require::ProfileRead::AUTHORITY, Authority::ProfileRead);
        assert_eq!(require::AccountsDelete::AUTHORITY, Authority::AccountsDelete);
    }
}
