//! Core types and policy for warden.
//!
//! This crate provides the foundational, I/O-free pieces of the authorization
//! model used throughout the workspace:
//!
//! - **Roles and authorities**: the closed role enumeration and its static
//!   mapping to fine-grained authorities
//! - **Principal**: the authenticated identity attached to a single request
//! - **Role mutation guard**: the `ROOT` escalation check applied to every
//!   role-set change
//!
//! # Example
//!
//! ```
//! use warden_core::{authorities_of, authorize_role_change, Authority, Principal, Role, RoleSet};
//!
//! let roles: RoleSet = [Role::Admin, Role::User].into_iter().collect();
//! assert!(authorities_of(&roles).contains(&Authority::AccountsRead));
//!
//! // An ADMIN cannot hand out ROOT.
//! let admin = Principal::new("admin", roles);
//! let current: RoleSet = [Role::User].into_iter().collect();
//! let proposed: RoleSet = [Role::Root, Role::User].into_iter().collect();
//! assert!(authorize_role_change(&current, &proposed, Some(&admin)).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod guard;
pub mod principal;
pub mod role;

pub use error::{CoreError, Result};
pub use guard::{authorize_role_change, involves_root};
pub use principal::Principal;
pub use role::{authorities_of, Authority, AuthoritySet, Role, RoleSet};
