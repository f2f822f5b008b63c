//! `RocksDB` storage layer for warden.
//!
//! This crate provides persistent storage for accounts using `RocksDB` with
//! column families.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Account records, keyed by username
//!
//! Values are CBOR-encoded.
//!
//! # Example
//!
//! ```no_run
//! use warden_core::{Role, RoleSet};
//! use warden_store::{Account, RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/warden-db").unwrap();
//!
//! let roles: RoleSet = [Role::User].into_iter().collect();
//! store.insert_account(&Account::new("alice", "$argon2id$...", roles, true)).unwrap();
//!
//! let alice = store.get_account("alice").unwrap();
//! assert!(alice.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::Account;

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, username: &str) -> Result<Option<Account>>;

    /// Insert or replace an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Insert a new account record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the username is taken.
    fn insert_account(&self, account: &Account) -> Result<()>;

    /// Delete an account by username.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_account(&self, username: &str) -> Result<()>;

    /// Read, modify and write back an account as one step.
    ///
    /// `update` sees the latest committed record; no insert, delete or other
    /// update on the store interleaves with it. An error from `update`
    /// leaves the record untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` (converted into `E`) if the account
    /// doesn't exist, or whatever `update` returns.
    fn update_account<F, E>(&self, username: &str, update: F) -> std::result::Result<Account, E>
    where
        Self: Sized,
        F: FnOnce(&mut Account) -> std::result::Result<(), E>,
        E: From<StoreError>;

    /// List all accounts, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Check that the database answers reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    fn ping(&self) -> Result<()>;
}
