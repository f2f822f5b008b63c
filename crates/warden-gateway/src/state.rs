//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use warden_auth::TokenCodec;
use warden_control::{AccountManager, AuthGate, Authenticator, StoreCredentialVerifier};
use warden_store::Store;

use crate::config::GatewayConfig;

/// Login and refresh orchestrator backed by the account store.
pub type StoreAuthenticator<S> = Authenticator<S, StoreCredentialVerifier<S>>;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
pub struct GatewayState<S, A>
where
    S: Store,
    A: AccountManager,
{
    /// Account management operations.
    pub accounts: Arc<A>,
    /// Login and refresh.
    pub authenticator: Arc<StoreAuthenticator<S>>,
    /// Per-request principal resolution.
    pub gate: Arc<AuthGate<S>>,
    /// Account store, probed by the health check.
    pub store: Arc<S>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<S, A> GatewayState<S, A>
where
    S: Store,
    A: AccountManager,
{
    /// Create a new gateway state.
    ///
    /// The gate and the authenticator share `store` and `codec`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        codec: Arc<TokenCodec>,
        accounts: Arc<A>,
        config: GatewayConfig,
    ) -> Self {
        let verifier = StoreCredentialVerifier::new(Arc::clone(&store));
        let authenticator = Authenticator::new(Arc::clone(&codec), Arc::clone(&store), verifier);

        Self {
            accounts,
            authenticator: Arc::new(authenticator),
            gate: Arc::new(AuthGate::new(codec, Arc::clone(&store))),
            store,
            config,
        }
    }
}

impl<S, A> Clone for GatewayState<S, A>
where
    S: Store,
    A: AccountManager,
{
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            authenticator: Arc::clone(&self.authenticator),
            gate: Arc::clone(&self.gate),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}
