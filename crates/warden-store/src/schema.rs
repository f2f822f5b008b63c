//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage and the
//! key encoding for each.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records, keyed by the UTF-8 bytes of the username.
    pub const ACCOUNTS: &str = "accounts";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS]
}

/// Key for an account record.
#[must_use]
pub fn account_key(username: &str) -> &[u8] {
    username.as_bytes()
}
