//! Profile endpoints for the caller's own account.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use warden_control::{AccountManager, PasswordUpdateRequest};
use warden_store::Store;

use crate::auth::{require, Authorized};
use crate::error::ApiError;
use crate::handlers::ValidJson;
use crate::state::GatewayState;

/// Get the caller's profile.
///
/// # Errors
///
/// Returns an error if the account lookup fails.
pub async fn get_profile<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    auth: Authorized<require::ProfileRead>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let profile = state.accounts.profile(auth.principal().username()).await?;
    Ok(Json(profile))
}

/// Change the caller's password.
///
/// # Errors
///
/// Returns `400` if the current password does not match.
pub async fn update_password<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    auth: Authorized<require::ProfileUpdate>,
    ValidJson(body): ValidJson<PasswordUpdateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    state
        .accounts
        .update_password(auth.principal().username(), body)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
