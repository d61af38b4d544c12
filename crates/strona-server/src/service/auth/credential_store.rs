//! Persistent mapping from account name to password digest.

use std::fmt;

use async_trait::async_trait;
use strona_postgres::model::{Account, NewAccount};
use strona_postgres::query::AccountRepository;
use strona_postgres::types::{AccountConstraints, ConstraintViolation};
use strona_postgres::{PgClient, PgError};

use crate::BoxedError;

const TRACING_TARGET_STORE: &str = "strona_server::service::store";

/// An account as read back from the credential store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredAccount {
    /// Unique account name.
    pub name: String,
    /// Salted password digest in PHC string format.
    pub password_hash: String,
}

impl StoredAccount {
    /// Creates a new stored account.
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl From<Account> for StoredAccount {
    fn from(account: Account) -> Self {
        Self {
            name: account.name,
            password_hash: account.password_hash,
        }
    }
}

impl fmt::Debug for StoredAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAccount")
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Failures of a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An account with this name already exists.
    #[error("account name is already taken")]
    Conflict,

    /// The store could not serve the request.
    #[error("credential store failure: {0}")]
    Backend(#[source] BoxedError),
}

impl StoreError {
    /// Wraps any backend error.
    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(error))
    }
}

impl From<PgError> for StoreError {
    fn from(error: PgError) -> Self {
        if let Some(ConstraintViolation::Account(AccountConstraints::NameUnique)) =
            error.constraint_violation()
        {
            return Self::Conflict;
        }

        tracing::warn!(
            target: TRACING_TARGET_STORE,
            %error,
            transient = error.is_transient(),
            hint = error.hint(),
            "postgres call failed"
        );
        Self::backend(error)
    }
}

/// Storage of account credentials.
///
/// Lookups are exact, byte-for-byte matches on the name. Implementations
/// must make [`insert`] atomic with respect to the name: of two concurrent
/// inserts for one name, exactly one succeeds and the other returns
/// [`StoreError::Conflict`].
///
/// [`insert`]: CredentialStore::insert
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds the account with exactly this name.
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredAccount>, StoreError>;

    /// Stores a new account.
    async fn insert(&self, name: &str, password_hash: &str) -> Result<(), StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl CredentialStore for PgClient {
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredAccount>, StoreError> {
        // Postgres rejects NUL in text, so no stored name can contain one.
        if name.contains('\0') {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        let account = conn.find_account_by_name(name).await?;
        Ok(account.map(StoredAccount::from))
    }

    async fn insert(&self, name: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        conn.create_account(NewAccount::new(name, password_hash))
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        PgClient::ping(self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
    use strona_postgres::PgConfig;
    use strona_postgres::error::DieselError;

    use super::*;

    struct DuplicateName;

    impl DatabaseErrorInformation for DuplicateName {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_name_unique\""
        }

        fn details(&self) -> Option<&str> {
            Some("Key (name)=(alice) already exists.")
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            Some("users")
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            Some("users_name_unique")
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn unique_name_violation_is_a_conflict() {
        let error = PgError::Query(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(DuplicateName),
        ));
        assert!(matches!(StoreError::from(error), StoreError::Conflict));
    }

    #[tokio::test]
    async fn name_with_nul_is_never_found() -> anyhow::Result<()> {
        // Nothing listens on port 1; a lookup that reached the pool would fail.
        let client = PgConfig::new("postgresql://strona@127.0.0.1:1/strona")
            .with_connection_timeout_secs(1)
            .build()?;

        let found = client.find_by_name("gh\0ost").await?;
        assert!(found.is_none());
        Ok(())
    }

    #[test]
    fn pg_errors_without_known_constraint_are_backend_failures() {
        let error = StoreError::from(PgError::Config("missing url".into()));
        assert!(matches!(error, StoreError::Backend(_)));

        let error = StoreError::from(PgError::Unexpected("pool closed".into()));
        assert!(matches!(error, StoreError::Backend(_)));
    }

    #[test]
    fn stored_account_debug_redacts_digest() {
        let account = StoredAccount::new("alice", "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA");
        let debug = format!("{account:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("argon2id"));
    }
}
