//! Error types for account management.
//!
//! This module defines all errors that can occur during account,
//! profile and password operations.

use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in account management operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The requested account was not found.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// An account with this username already exists.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// The supplied current password did not match.
    #[error("current password does not match")]
    InvalidPasswordUpdate,

    /// The request failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The caller may not grant or revoke `ROOT`.
    #[error("role escalation denied")]
    EscalationDenied,

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(#[from] warden_auth::AuthError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] warden_store::StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_) => 404,
            Self::AccountExists(_) => 409,
            Self::InvalidPasswordUpdate | Self::Validation(_) => 400,
            Self::EscalationDenied => 403,
            Self::Auth(e) => e.http_status_code(),
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}
