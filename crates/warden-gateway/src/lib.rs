//! HTTP gateway for the warden account service.
//!
//! This crate provides the public-facing API. It handles:
//!
//! - Bearer token authentication on every request (the gate middleware)
//! - Login and refresh endpoints
//! - Authority checks per route
//! - Profile and account management endpoints
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       warden-gateway                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │    Gate     │ │  Authority  │ │  Router + Handlers  │    │
//! │  │ middleware  │ │  extractor  │ │                     │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌──────────┐
//!        │ AuthGate │   │  Authn   │   │ Accounts │
//!        └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_auth::{AuthConfig, TokenCodec};
//! use warden_control::AccountService;
//! use warden_gateway::{create_router, GatewayConfig, GatewayState};
//! use warden_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize dependencies
//! let store = Arc::new(RocksStore::open("/tmp/warden")?);
//! let codec = Arc::new(TokenCodec::with_system_clock(&AuthConfig::new("...base64..."))?);
//! let accounts = Arc::new(AccountService::with_defaults(store.clone()));
//!
//! // Create gateway state
//! let config = GatewayConfig::default();
//! let state = GatewayState::new(store, codec, accounts, config);
//!
//! // Create router
//! let app = create_router(state);
//!
//! // Run server
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{env_var, ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::{AuthPrincipal, Authorized};
