//! Listener errors.

use std::io;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Failure while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Accepting or serving connections failed.
    #[error("server failed: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// What the operator can try, for the io errors that have an obvious fix.
    pub fn suggestion(&self) -> Option<&'static str> {
        let (Self::Bind { source, .. } | Self::Runtime(source)) = self;
        let hint = match source.kind() {
            io::ErrorKind::AddrInUse => "another process holds this port; set PORT to a free one",
            io::ErrorKind::PermissionDenied => "binding this port needs privileges; use PORT >= 1024",
            io::ErrorKind::AddrNotAvailable => "HOST is not an address of this machine",
            _ => return None,
        };
        Some(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_errors_carry_suggestions() {
        let error = ServerError::Bind {
            address: "127.0.0.1:3000".to_owned(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert!(error.to_string().contains("127.0.0.1:3000"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn unknown_runtime_errors_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("boom"));
        assert!(error.suggestion().is_none());
    }
}
