//! In-process credential stores for database-free tests.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CredentialStore, StoreError, StoredAccount};

/// Map-backed store with atomic insert-if-absent.
#[derive(Debug, Default)]
pub(crate) struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.lock().map(|accounts| accounts.len()).unwrap_or(0)
    }

    pub(crate) fn password_hash(&self, name: &str) -> Option<String> {
        let accounts = self.accounts.lock().ok()?;
        accounts.get(name).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredAccount>, StoreError> {
        let accounts = self.accounts.lock().map_err(|e| poisoned(&e))?;
        Ok(accounts
            .get(name)
            .map(|password_hash| StoredAccount::new(name, password_hash.as_str())))
    }

    async fn insert(&self, name: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().map_err(|e| poisoned(&e))?;
        match accounts.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(entry) => {
                entry.insert(password_hash.to_owned());
                Ok(())
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn poisoned(error: &dyn std::fmt::Display) -> StoreError {
    StoreError::backend(std::io::Error::other(error.to_string()))
}

/// Store whose lookups never see existing rows, so every duplicate reaches
/// the insert and hits the uniqueness check there.
#[derive(Debug, Default)]
pub(crate) struct BlindLookupStore {
    inner: MemoryCredentialStore,
}

#[async_trait]
impl CredentialStore for BlindLookupStore {
    async fn find_by_name(&self, _name: &str) -> Result<Option<StoredAccount>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, name: &str, password_hash: &str) -> Result<(), StoreError> {
        self.inner.insert(name, password_hash).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store that fails every call.
#[derive(Debug, Default)]
pub(crate) struct FailingCredentialStore;

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn find_by_name(&self, _name: &str) -> Result<Option<StoredAccount>, StoreError> {
        Err(connection_refused())
    }

    async fn insert(&self, _name: &str, _password_hash: &str) -> Result<(), StoreError> {
        Err(connection_refused())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(connection_refused())
    }
}

fn connection_refused() -> StoreError {
    StoreError::backend(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused by 10.0.0.7:5432",
    ))
}

/// Store whose calls never complete.
#[derive(Debug, Default)]
pub(crate) struct StallingCredentialStore;

#[async_trait]
impl CredentialStore for StallingCredentialStore {
    async fn find_by_name(&self, _name: &str) -> Result<Option<StoredAccount>, StoreError> {
        std::future::pending().await
    }

    async fn insert(&self, _name: &str, _password_hash: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        std::future::pending().await
    }
}
