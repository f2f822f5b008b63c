//! Authentication and account management for warden.
//!
//! This crate provides the business logic behind the HTTP surface: the
//! per-request authentication gate, the login/refresh protocols and the
//! account service. It coordinates between the token codec and the storage
//! layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Gateway (HTTP)                       │
//! └─────────────────────────────────────────────────────────────┘
//!          │                     │                      │
//!          ▼                     ▼                      ▼
//!   ┌─────────────┐      ┌───────────────┐     ┌─────────────────┐
//!   │  AuthGate   │      │ Authenticator │     │ AccountService  │
//!   │ (per req.)  │      │ login/refresh │     │ CRUD + guard    │
//!   └─────────────┘      └───────────────┘     └─────────────────┘
//!          │                     │                      │
//!          ├──────────┬──────────┘                      │
//!          ▼          ▼                                 ▼
//!   ┌────────────┐ ┌──────────────────┐        ┌──────────────┐
//!   │ TokenCodec │ │ CredentialVerif. │───────▶│    Store     │
//!   │   (JWT)    │ │    (Argon2id)    │        │  (RocksDB)   │
//!   └────────────┘ └──────────────────┘        └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_auth::{AuthConfig, TokenCodec};
//! use warden_control::{
//!     Authenticator, AccountService, ControlConfig, StoreCredentialVerifier,
//! };
//! use warden_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/warden")?);
//! let codec = Arc::new(TokenCodec::with_system_clock(&AuthConfig::new("...base64..."))?);
//!
//! let accounts = AccountService::new(
//!     store.clone(),
//!     ControlConfig { create_default_accounts: true },
//! );
//! accounts.initialize()?;
//!
//! let verifier = StoreCredentialVerifier::new(store.clone());
//! let authn = Authenticator::new(codec, store, verifier);
//! let tokens = authn.login("admin", "admin").await?;
//! println!("access token: {}", tokens.access_token);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod authn;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod service;
pub mod types;

pub use authn::Authenticator;
pub use credentials::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
    AccountIdentity, CredentialVerifier, StoreCredentialVerifier,
};
pub use error::{ControlError, Result};
pub use gate::{AuthGate, BEARER_PREFIX, REFRESH_ENDPOINT};
pub use service::{AccountManager, AccountService};
pub use types::{
    AccountInfo, ControlConfig, CreateAccountRequest, LoginRequest, PasswordUpdateRequest,
    ProfileInfo, RefreshedToken, TokenPair, UpdateAccountRequest,
};

// Re-export commonly used types from dependencies for convenience
pub use warden_core::{Authority, Principal, Role, RoleSet};
