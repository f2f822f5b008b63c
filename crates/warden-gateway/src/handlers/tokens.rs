//! Login and refresh endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use warden_control::{AccountManager, LoginRequest};
use warden_store::Store;

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::handlers::ValidJson;
use crate::state::GatewayState;

/// Exchange a username and password for an access and refresh token.
///
/// ```text
/// POST /auth/token
/// { "username": "admin", "password": "admin" }
///
/// Response: 200 OK
/// { "accessToken": "...", "refreshToken": "..." }
/// ```
///
/// # Errors
///
/// Returns `401` with an empty body for any credential failure.
pub async fn login<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let pair = state
        .authenticator
        .login(&body.username, &body.password)
        .await?;

    Ok(Json(pair))
}

/// Mint a new access token. Requires a refresh token.
///
/// ```text
/// POST /auth/refresh
/// Authorization: Bearer <refresh token>
///
/// Response: 200 OK
/// { "accessToken": "..." }
/// ```
///
/// # Errors
///
/// Returns `401` if no principal was resolved or the account is gone.
pub async fn refresh<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let token = state.authenticator.refresh(&principal)?;
    Ok(Json(token))
}
