//! Common error types for warden.
//!
//! This module provides shared error types that are used across multiple crates.

use crate::role::Authority;
use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors raised by the role model, the principal and the guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A role name did not match any known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// An authority name did not match any known authority.
    #[error("unknown authority: {0}")]
    UnknownAuthority(String),

    /// A role change adding or removing `ROOT` was attempted by a caller
    /// that does not hold `ROOT`.
    #[error("role escalation denied")]
    EscalationDenied,

    /// The principal lacks an authority required by the operation.
    #[error("missing authority: {0}")]
    MissingAuthority(Authority),
}
