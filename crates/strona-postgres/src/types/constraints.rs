//! Named constraints declared by the migrations.
//!
//! Postgres reports the constraint name of a failed insert; these enums turn
//! that name back into something callers can match on.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Constraints on the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, EnumString, EnumIter, IntoStaticStr)]
pub enum AccountConstraints {
    #[strum(serialize = "users_name_not_empty")]
    NameNotEmpty,
    #[strum(serialize = "users_password_not_empty")]
    PasswordNotEmpty,
    #[strum(serialize = "users_name_unique")]
    NameUnique,
}

/// A recognised constraint, grouped by table.
///
/// Serialized as the bare constraint name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[derive(Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Account(AccountConstraints),
}

impl ConstraintViolation {
    /// Looks up a constraint by the name Postgres reported.
    ///
    /// ```
    /// use strona_postgres::types::ConstraintViolation;
    ///
    /// assert!(ConstraintViolation::new("users_name_unique").is_some());
    /// assert!(ConstraintViolation::new("orders_pkey").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        constraint
            .parse::<AccountConstraints>()
            .ok()
            .map(Self::Account)
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Self::Account(_) => "users",
        }
    }
}

impl From<ConstraintViolation> for String {
    fn from(violation: ConstraintViolation) -> Self {
        violation.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(&name).ok_or_else(|| format!("unknown constraint `{name}`"))
    }
}
