//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
///
/// Every variant except the configuration and internal ones is surfaced to
/// clients as the same opaque `401`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token structure, encoding or claims could not be parsed, or the
    /// token does not carry exactly one type discriminator.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token signature does not match.
    #[error("invalid signature")]
    BadSignature,

    /// The token has expired.
    #[error("token expired")]
    Expired,

    /// The token type is not accepted on the requested endpoint.
    #[error("invalid token type")]
    WrongTokenType,

    /// Primary credentials were rejected. Unknown user, wrong password and
    /// disabled account are deliberately not distinguished.
    #[error("bad credentials")]
    BadCredentials,

    /// The token subject no longer resolves to an active account.
    #[error("account not found")]
    AccountNotFound,

    /// The signing key configuration is unusable.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Malformed(_)
            | Self::BadSignature
            | Self::Expired
            | Self::WrongTokenType
            | Self::BadCredentials
            | Self::AccountNotFound => 401,
            Self::InvalidKey(_) | Self::Internal(_) => 500,
        }
    }
}
