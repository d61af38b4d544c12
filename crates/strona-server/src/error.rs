//! Startup failures: bad configuration, unreachable database, failed
//! migrations.
//!
//! Per-request failures use [`AuthError`] and the handler [`Error`] instead.
//!
//! [`AuthError`]: crate::service::AuthError
//! [`Error`]: crate::handler::Error

use std::borrow::Cow;
use std::error::Error as StdError;

use strona_postgres::PgError;

pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What part of startup went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A setting is missing or out of range.
    Config,
    /// A dependency (the database) could not be reached.
    External,
    /// A dependency answered, but the result was unusable.
    Internal,
}

/// Startup error: a kind, a readable message and the underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    fn with_kind(kind: ErrorKind, message: Cow<'static, str>) -> Self {
        Self {
            kind,
            message,
            source: None,
        }
    }

    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Config, message.into())
    }

    /// `"<component>: <message>"` for an unreachable dependency.
    pub fn external(component: &str, message: impl AsRef<str>) -> Self {
        Self::with_kind(
            ErrorKind::External,
            format!("{component}: {}", message.as_ref()).into(),
        )
    }

    /// `"<component>: <message>"` for a dependency that misbehaved.
    pub fn internal(component: &str, message: impl AsRef<str>) -> Self {
        Self::with_kind(
            ErrorKind::Internal,
            format!("{component}: {}", message.as_ref()).into(),
        )
    }

    pub fn with_source(self, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PgError> for Error {
    fn from(err: PgError) -> Self {
        let kind = if matches!(err, PgError::Config(_)) {
            ErrorKind::Config
        } else {
            ErrorKind::External
        };
        Self::with_kind(kind, format!("postgres: {err}").into()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.to_string(), "config: invalid configuration");
    }

    #[test]
    fn component_and_source_are_kept() {
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "blocking pool stalled");
        let error = Error::internal("hasher", "cannot build dummy digest").with_source(cause);

        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(error.message(), "hasher: cannot build dummy digest");
        assert!(StdError::source(&error).is_some());
    }

    #[test]
    fn postgres_config_errors_stay_config_errors() {
        let error = Error::from(PgError::Config("max_connections out of range".into()));
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(error.message().starts_with("postgres: "));

        let error = Error::from(PgError::Unexpected("pool closed".into()));
        assert_eq!(error.kind(), ErrorKind::External);
    }

    #[test]
    fn kind_names() {
        let name: &'static str = ErrorKind::External.into();
        assert_eq!(name, "external");
        assert_eq!(ErrorKind::Internal.to_string(), "internal");
    }
}
