//! JWT issuance and verification for warden.
//!
//! This crate provides the token codec used by the authentication layer:
//!
//! - HS256 signing with a single process-wide symmetric key
//! - Two token types, `ACCESS` and `REFRESH`, each with its own lifetime
//! - Strict type discrimination: a token decodes as exactly one type
//! - Expiry checked against an injectable [`Clock`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Orchestrator   │────▶│                  │
//! │ (login/refresh)  │issue│                  │
//! └──────────────────┘     │    TokenCodec    │
//! ┌──────────────────┐     │  (HS256 + TTLs)  │
//! │  Gate (per req)  │────▶│                  │
//! └──────────────────┘verify└────────┬─────────┘
//!                                   │ now()
//!                          ┌────────▼─────────┐
//!                          │      Clock       │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use warden_auth::{AuthConfig, TokenCodec, TokenKind};
//! use warden_core::{Role, RoleSet};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new("c2VjcmV0LXNlY3JldC1zZWNyZXQtc2VjcmV0LXNlY3JldC0xMjM0NTY3OA==");
//! let codec = TokenCodec::with_system_clock(&config)?;
//!
//! let roles: RoleSet = [Role::User].into_iter().collect();
//! let token = codec.issue(TokenKind::Access, "alice", &roles)?;
//!
//! let decoded = codec.verify(&token)?;
//! assert_eq!(decoded.subject, "alice");
//! assert_eq!(decoded.kind, TokenKind::Access);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod codec;
pub mod error;

use std::fmt;

pub use clock::{Clock, SystemClock};
pub use codec::{Token, TokenCodec, TokenKind};
pub use error::{AuthError, Result};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;

/// Default access token lifetime: five minutes.
pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 300;

/// Default refresh token lifetime: one day.
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 86_400;

/// Configuration for token issuance.
#[derive(Clone)]
pub struct AuthConfig {
    /// Base64-encoded HMAC secret. Must decode to at least 32 bytes.
    pub secret_key: String,
    /// Access token lifetime, in seconds.
    pub access_ttl_seconds: u64,
    /// Refresh token lifetime, in seconds.
    pub refresh_ttl_seconds: u64,
}

impl AuthConfig {
    /// Create a configuration with the default token lifetimes.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    /// Override both token lifetimes.
    #[must_use]
    pub const fn with_ttls(mut self, access_ttl_seconds: u64, refresh_ttl_seconds: u64) -> Self {
        self.access_ttl_seconds = access_ttl_seconds;
        self.refresh_ttl_seconds = refresh_ttl_seconds;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttls() {
        let config = AuthConfig::new("secret");
        assert_eq!(config.access_ttl_seconds, 300);
        assert_eq!(config.refresh_ttl_seconds, 86_400);

        let config = config.with_ttls(5, 60);
        assert_eq!(config.access_ttl_seconds, 5);
        assert_eq!(config.refresh_ttl_seconds, 60);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig::new("top-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn auth_error_status_codes() {
        assert_eq!(AuthError::Expired.http_status_code(), 401);
        assert_eq!(AuthError::BadSignature.http_status_code(), 401);
        assert_eq!(AuthError::Malformed("x".into()).http_status_code(), 401);
        assert_eq!(AuthError::WrongTokenType.http_status_code(), 401);
        assert_eq!(AuthError::BadCredentials.http_status_code(), 401);
        assert_eq!(AuthError::AccountNotFound.http_status_code(), 401);
        assert_eq!(AuthError::InvalidKey("x".into()).http_status_code(), 500);
    }
}
