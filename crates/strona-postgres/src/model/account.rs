//! Account model for the `users` table.

use std::fmt;

use diesel::prelude::*;

use crate::schema::users;

/// A registered account.
#[derive(Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    /// Surrogate primary key.
    pub id: i64,
    /// Unique account name, compared byte for byte.
    pub name: String,
    /// Salted password digest in PHC string format.
    #[diesel(column_name = password)]
    pub password_hash: String,
}

/// Data for creating a new account.
#[derive(Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    /// Unique account name.
    pub name: String,
    /// Salted password digest, never the plaintext.
    #[diesel(column_name = password)]
    pub password_hash: String,
}

impl NewAccount {
    /// Creates a new insertable account.
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_digest() {
        let account = Account {
            id: 1,
            name: "alice".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
        };

        let debug = format!("{account:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("argon2id"));

        let new_account = NewAccount::new("bob", "$argon2id$secret");
        assert!(!format!("{new_account:?}").contains("argon2id"));
    }
}
