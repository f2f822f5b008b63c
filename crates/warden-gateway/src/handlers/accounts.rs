//! Account management endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use warden_control::{AccountManager, CreateAccountRequest, UpdateAccountRequest};
use warden_store::Store;

use crate::auth::{require, Authorized};
use crate::error::ApiError;
use crate::handlers::ValidJson;
use crate::state::GatewayState;

/// List all accounts.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list_accounts<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    _auth: Authorized<require::AccountsRead>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let accounts = state.accounts.list_accounts().await?;
    Ok(Json(accounts))
}

/// Create a new account.
///
/// # Errors
///
/// Returns an error if:
/// - A field is blank or the role set is empty (`400`)
/// - The account would hold `ROOT` and the caller does not (`403`)
/// - The username is taken (`409`)
pub async fn create_account<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    auth: Authorized<require::AccountsCreate>,
    ValidJson(body): ValidJson<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let account = state
        .accounts
        .create_account(body, Some(auth.principal()))
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Get an account by username.
///
/// # Errors
///
/// Returns `404` if the account doesn't exist.
pub async fn get_account<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    _auth: Authorized<require::AccountsRead>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let account = state.accounts.get_account(&username).await?;
    Ok(Json(account))
}

/// Partially update an account.
///
/// # Errors
///
/// Returns `404` if the account doesn't exist and `403` if the change
/// grants or revokes `ROOT` without the caller holding it.
pub async fn update_account<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    auth: Authorized<require::AccountsUpdate>,
    Path(username): Path<String>,
    ValidJson(body): ValidJson<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let account = state
        .accounts
        .update_account(&username, body, Some(auth.principal()))
        .await?;

    Ok(Json(account))
}

/// Delete an account.
///
/// # Errors
///
/// Returns `404` if the account doesn't exist.
pub async fn delete_account<S, A>(
    State(state): State<Arc<GatewayState<S, A>>>,
    _auth: Authorized<require::AccountsDelete>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    state.accounts.delete_account(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}
