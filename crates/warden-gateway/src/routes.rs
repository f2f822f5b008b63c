//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use warden_control::AccountManager;
use warden_store::Store;

use crate::auth;
use crate::handlers::{accounts, health, profile, tokens};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /auth/token` - Login
///
/// ## Refresh token
/// - `GET|POST /auth/refresh` - Mint a new access token
///
/// ## Profile (access token)
/// - `GET /profile` - Own profile (`PROFILE_READ`)
/// - `PATCH /profile` - Change own password (`PROFILE_UPDATE`)
///
/// ## Accounts (access token)
/// - `GET /accounts` - List accounts (`ACCOUNTS_READ`)
/// - `POST /accounts` - Create account (`ACCOUNTS_CREATE`)
/// - `GET /accounts/:username` - Get account (`ACCOUNTS_READ`)
/// - `PATCH /accounts/:username` - Update account (`ACCOUNTS_UPDATE`)
/// - `DELETE /accounts/:username` - Delete account (`ACCOUNTS_DELETE`)
pub fn create_router<S, A>(state: GatewayState<S, A>) -> Router
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health::<S, A>))
        // Tokens
        .route("/auth/token", post(tokens::login::<S, A>))
        .route(
            "/auth/refresh",
            get(tokens::refresh::<S, A>).post(tokens::refresh::<S, A>),
        )
        // Profile
        .route(
            "/profile",
            get(profile::get_profile::<S, A>).patch(profile::update_password::<S, A>),
        )
        // Accounts
        .route(
            "/accounts",
            get(accounts::list_accounts::<S, A>).post(accounts::create_account::<S, A>),
        )
        .route(
            "/accounts/:username",
            get(accounts::get_account::<S, A>)
                .patch(accounts::update_account::<S, A>)
                .delete(accounts::delete_account::<S, A>),
        )
        // Authentication gate, innermost so it sees every routed request
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::gate::<S, A>,
        ))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
