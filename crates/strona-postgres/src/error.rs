//! [`PgError`] and the diesel/deadpool errors it wraps.

use std::borrow::Cow;

pub use deadpool::managed::TimeoutType;
pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

use crate::TRACING_TARGET_CONNECTION;
use crate::types::ConstraintViolation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can go wrong between this crate and Postgres.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    #[error("invalid database configuration: {0}")]
    Config(String),

    /// The pool gave up waiting for, opening, or recycling a connection.
    #[error("database {0:?} timeout")]
    Timeout(TimeoutType),

    #[error("database connection failed: {0}")]
    Connection(#[from] DieselConnectionError),

    #[error("database migration failed: {0}")]
    Migration(BoxError),

    /// SQL errors, including constraint violations.
    #[error("database query failed: {0}")]
    Query(#[from] DieselError),

    #[error("database error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Name of the violated constraint, for database errors that carry one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::Query(DieselError::DatabaseError(_, info)) => info.constraint_name(),
            _ => None,
        }
    }

    /// The violated constraint, if it is one this crate declares.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.constraint().and_then(ConstraintViolation::new)
    }

    /// Whether the same call could succeed a moment later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(DieselConnectionError::BadConnection(_))
        )
    }

    /// Operator-facing advice for pool timeouts.
    pub fn hint(&self) -> Option<&'static str> {
        let Self::Timeout(stage) = self else {
            return None;
        };
        Some(match stage {
            TimeoutType::Wait => "all pooled connections are busy; raise POSTGRES_MAX_CONNECTIONS",
            TimeoutType::Create => "cannot open a connection; check POSTGRES_URL and that the server is up",
            TimeoutType::Recycle => "an idle connection did not answer its reuse check",
        })
    }
}

impl From<DeadpoolError> for PgError {
    fn from(value: DeadpoolError) -> Self {
        match value {
            DeadpoolError::Timeout(stage) => Self::Timeout(stage),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::PostCreateHook(error) => {
                tracing::warn!(target: TRACING_TARGET_CONNECTION, %error, "new connection rejected");
                Self::Connection(DieselConnectionError::BadConnection(error.to_string()))
            }
            DeadpoolError::Closed => Self::Unexpected("connection pool is closed".into()),
            DeadpoolError::NoRuntimeSpecified => {
                Self::Unexpected("connection pool has no async runtime".into())
            }
        }
    }
}

pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};

    use super::*;
    use crate::types::AccountConstraints;

    struct UniqueViolation;

    impl DatabaseErrorInformation for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_name_unique\""
        }

        fn details(&self) -> Option<&str> {
            None
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

    fn unique_violation() -> PgError {
        PgError::Query(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(UniqueViolation),
        ))
    }

    #[test]
    fn constraint_name_is_extracted_from_query_errors() {
        let error = unique_violation();
        assert_eq!(error.constraint(), Some("users_name_unique"));
        assert_eq!(
            error.constraint_violation(),
            Some(ConstraintViolation::Account(AccountConstraints::NameUnique))
        );
    }

    #[test]
    fn non_query_errors_carry_no_constraint() {
        let error = PgError::Config("missing url".into());
        assert!(error.constraint().is_none());
        assert!(error.constraint_violation().is_none());

        let error = PgError::Query(DieselError::NotFound);
        assert!(error.constraint().is_none());
    }

    #[test]
    fn only_timeouts_and_bad_connections_are_transient() {
        let error = PgError::from(DeadpoolError::Timeout(TimeoutType::Wait));
        assert!(error.is_transient());
        assert!(error.hint().is_some_and(|hint| hint.contains("POSTGRES_MAX_CONNECTIONS")));

        let error = PgError::Connection(DieselConnectionError::BadConnection("reset".into()));
        assert!(error.is_transient());
        assert!(error.hint().is_none());

        assert!(!unique_violation().is_transient());
        assert!(!PgError::from(DeadpoolError::Closed).is_transient());
    }
}
