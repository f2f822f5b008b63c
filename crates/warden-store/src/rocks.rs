//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options,
};

use crate::error::{Result, StoreError};
use crate::schema::{account_key, all_column_families, cf};
use crate::types::Account;
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Held across every read-then-write sequence (insert, update, delete).
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn exists(&self, username: &str) -> Result<bool> {
        let cf = self.cf(cf::ACCOUNTS)?;
        Ok(self
            .db
            .get_pinned_cf(&cf, account_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some())
    }

    fn write_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, account_key(&account.username), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    fn get_account(&self, username: &str) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;

        self.db
            .get_cf(&cf, account_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        self.write_account(account)
    }

    fn insert_account(&self, account: &Account) -> Result<()> {
        let _guard = self.write_lock.lock();

        if self.exists(&account.username)? {
            return Err(StoreError::AlreadyExists);
        }

        self.write_account(account)?;
        tracing::debug!(username = %account.username, "Inserted account");
        Ok(())
    }

    fn update_account<F, E>(&self, username: &str, update: F) -> std::result::Result<Account, E>
    where
        F: FnOnce(&mut Account) -> std::result::Result<(), E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock();

        let mut account = self.get_account(username)?.ok_or(StoreError::NotFound)?;
        update(&mut account)?;
        self.write_account(&account)?;

        tracing::debug!(username = %username, "Updated account");
        Ok(account)
    }

    fn delete_account(&self, username: &str) -> Result<()> {
        let _guard = self.write_lock.lock();

        if !self.exists(username)? {
            return Err(StoreError::NotFound);
        }

        let cf = self.cf(cf::ACCOUNTS)?;
        self.db
            .delete_cf(&cf, account_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(username = %username, "Deleted account");
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;

        let mut accounts = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let account: Account = Self::deserialize(&value)?;
            accounts.push(account);
        }

        Ok(accounts)
    }

    fn ping(&self) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        self.db
            .property_int_value_cf(&cf, "rocksdb.estimate-num-keys")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use warden_core::{Role, RoleSet};

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn create_test_account(username: &str, roles: &[Role]) -> Account {
        let roles: RoleSet = roles.iter().copied().collect();
        Account::new(username, "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA", roles, true)
    }

    #[test]
    fn account_crud() {
        let (store, _dir) = create_test_store();
        let account = create_test_account("alice", &[Role::User]);

        // Create
        store.insert_account(&account).unwrap();

        // Read
        let retrieved = store.get_account("alice").unwrap().unwrap();
        assert_eq!(retrieved, account);

        // Update
        let mut updated = retrieved.clone();
        updated.enabled = false;
        updated.roles.insert(Role::Admin);
        store.put_account(&updated).unwrap();
        let reread = store.get_account("alice").unwrap().unwrap();
        assert!(!reread.enabled);
        assert!(reread.roles.contains(&Role::Admin));

        // Delete
        store.delete_account("alice").unwrap();
        assert!(store.get_account("alice").unwrap().is_none());
    }

    #[test]
    fn insert_rejects_duplicate() {
        let (store, _dir) = create_test_store();
        store
            .insert_account(&create_test_account("alice", &[Role::User]))
            .unwrap();

        let err = store
            .insert_account(&create_test_account("alice", &[Role::Admin]))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));

        // Original record untouched
        let stored = store.get_account("alice").unwrap().unwrap();
        assert_eq!(stored.roles, RoleSet::from([Role::User]));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (store, _dir) = create_test_store();
        let err = store.delete_account("ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn update_applies_change() {
        let (store, _dir) = create_test_store();
        store
            .insert_account(&create_test_account("alice", &[Role::User]))
            .unwrap();

        let updated = store
            .update_account("alice", |account| {
                account.enabled = false;
                Ok::<_, StoreError>(())
            })
            .unwrap();
        assert!(!updated.enabled);
        assert_eq!(store.get_account("alice").unwrap().unwrap(), updated);
    }

    #[test]
    fn update_missing_is_not_found() {
        let (store, _dir) = create_test_store();
        let err = store
            .update_account("ghost", |_| Ok::<_, StoreError>(()))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn failed_update_writes_nothing() {
        let (store, _dir) = create_test_store();
        store
            .insert_account(&create_test_account("alice", &[Role::User]))
            .unwrap();

        let err = store
            .update_account("alice", |account| {
                account.roles.insert(Role::Root);
                Err(StoreError::Database("rejected".into()))
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        let stored = store.get_account("alice").unwrap().unwrap();
        assert_eq!(stored.roles, RoleSet::from([Role::User]));
    }

    #[test]
    fn delete_waits_for_update() {
        let (store, _dir) = create_test_store();
        store
            .insert_account(&create_test_account("alice", &[Role::User]))
            .unwrap();

        std::thread::scope(|s| {
            store
                .update_account("alice", |account| {
                    let delete = s.spawn(|| store.delete_account("alice"));
                    std::thread::sleep(std::time::Duration::from_millis(50));
                    assert!(!delete.is_finished());
                    account.enabled = false;
                    Ok::<_, StoreError>(())
                })
                .unwrap();
        });

        // The delete ran after the update committed and was not undone by it.
        assert!(store.get_account("alice").unwrap().is_none());
    }

    #[test]
    fn ping_open_store() {
        let (store, _dir) = create_test_store();
        store.ping().unwrap();
    }

    #[test]
    fn list_accounts_is_ordered_by_username() {
        let (store, _dir) = create_test_store();
        for name in ["carol", "alice", "bob"] {
            store
                .insert_account(&create_test_account(name, &[Role::User]))
                .unwrap();
        }

        let names: Vec<String> = store
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .insert_account(&create_test_account("root", &[Role::Root, Role::Admin]))
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let root = store.get_account("root").unwrap().unwrap();
        assert!(root.roles.contains(&Role::Root));
    }
}
