//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use warden_control::AccountManager;
use warden_store::Store;

use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the account store answers, `degraded` otherwise.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Account store status: `ok` or `unavailable`.
    pub store: &'static str,
}

impl HealthResponse {
    /// Build the report for a given store state.
    #[must_use]
    pub const fn new(store_ok: bool) -> Self {
        let (status, store) = if store_ok {
            ("healthy", "ok")
        } else {
            ("degraded", "unavailable")
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
        }
    }

    /// `200` when healthy, `503` when degraded.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.store == "ok" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Health check handler.
///
/// Public. Reports whether the account store can be read, since no login
/// or token check can succeed without it.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// { "status": "healthy", "version": "0.1.0", "store": "ok" }
///
/// Response: 503 Service Unavailable
/// { "status": "degraded", "version": "0.1.0", "store": "unavailable" }
/// ```
pub async fn health<S, A>(State(state): State<Arc<GatewayState<S, A>>>) -> impl IntoResponse
where
    S: Store + 'static,
    A: AccountManager + 'static,
{
    let store_ok = match state.store.ping() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Account store health check failed");
            false
        }
    };

    let response = HealthResponse::new(store_ok);
    (response.status_code(), Json(response))
}
