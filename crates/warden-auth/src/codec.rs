//! Token issuance and verification.
//!
//! Tokens are compact HS256 JWTs. The claim set is:
//!
//! | claim     | meaning                                              |
//! |-----------|------------------------------------------------------|
//! | `sub`     | account username                                     |
//! | `iat`     | issue time, epoch seconds                            |
//! | `exp`     | expiry, epoch seconds                                |
//! | `roles`   | role names held at issue time                        |
//! | `access`  | `"jwt"`, present only on access tokens               |
//! | `refresh` | `"jwt"`, present only on refresh tokens              |
//!
//! Exactly one of `access` / `refresh` must be present; anything else is
//! rejected as malformed.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use warden_core::RoleSet;

use crate::clock::{Clock, SystemClock};
use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// Minimum decoded length of the signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Value carried by the type discriminator claim.
const DISCRIMINATOR_VALUE: &str = "jwt";

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived token accepted on every protected endpoint except refresh.
    Access,
    /// Long-lived token accepted only on the refresh endpoint.
    Refresh,
}

impl TokenKind {
    /// The claim name used as the type discriminator.
    #[must_use]
    pub const fn claim(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.claim())
    }
}

/// A verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Account username.
    pub subject: String,
    /// Token type.
    pub kind: TokenKind,
    /// Roles held when the token was issued.
    pub roles: RoleSet,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// On-the-wire claim set.
#[derive(Debug, Serialize, Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
    roles: RoleSet,
    iat: i64,
    exp: i64,
}

impl RawClaims {
    fn kind(&self) -> Result<TokenKind> {
        match (&self.access, &self.refresh) {
            (Some(_), None) => Ok(TokenKind::Access),
            (None, Some(_)) => Ok(TokenKind::Refresh),
            (Some(_), Some(_)) => Err(AuthError::Malformed(
                "token carries both type discriminators".into(),
            )),
            (None, None) => Err(AuthError::Malformed(
                "token carries no type discriminator".into(),
            )),
        }
    }
}

/// Issues and verifies access and refresh tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec from configuration and a time source.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the secret is not valid base64 or
    /// decodes to fewer than [`MIN_SECRET_BYTES`] bytes.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let secret = BASE64
            .decode(config.secret_key.trim())
            .map_err(|e| AuthError::InvalidKey(format!("secret is not valid base64: {e}")))?;

        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::InvalidKey(format!(
                "secret must decode to at least {MIN_SECRET_BYTES} bytes, got {}",
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            access_ttl: ttl(config.access_ttl_seconds),
            refresh_ttl: ttl(config.refresh_ttl_seconds),
            clock,
        })
    }

    /// Create a codec backed by the system clock.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::new`].
    pub fn with_system_clock(config: &AuthConfig) -> Result<Self> {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Lifetime of tokens of the given kind.
    #[must_use]
    pub const fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a signed token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if signing fails.
    pub fn issue(&self, kind: TokenKind, subject: &str, roles: &RoleSet) -> Result<String> {
        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at.saturating_add(self.ttl(kind).num_seconds());

        let (access, refresh) = match kind {
            TokenKind::Access => (Some(DISCRIMINATOR_VALUE.to_string()), None),
            TokenKind::Refresh => (None, Some(DISCRIMINATOR_VALUE.to_string())),
        };
        let claims = RawClaims {
            sub: subject.to_string(),
            access,
            refresh,
            roles: roles.clone(),
            iat: issued_at,
            exp: expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))?;

        tracing::debug!(subject = %subject, kind = %kind, exp = expires_at, "Issued token");

        Ok(token)
    }

    /// Verify a compact token and decode its claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::BadSignature` if the signature does not match
    /// - `AuthError::Malformed` if the structure or claims cannot be parsed,
    ///   or the token does not carry exactly one type discriminator
    /// - `AuthError::Expired` if the current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<Token> {
        let data = jsonwebtoken::decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::Malformed(e.to_string()),
            })?;

        let claims = data.claims;
        let kind = claims.kind()?;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            tracing::debug!(subject = %claims.sub, kind = %kind, "Token expired");
            return Err(AuthError::Expired);
        }

        Ok(Token {
            issued_at: timestamp(claims.iat, "iat")?,
            expires_at: timestamp(claims.exp, "exp")?,
            subject: claims.sub,
            kind,
            roles: claims.roles,
        })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

fn ttl(seconds: u64) -> Duration {
    let seconds = i64::try_from(seconds).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
    Duration::seconds(seconds)
}

fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AuthError::Malformed(format!("{claim} is out of range")))
}
