//! Rendering of [`AuthError`] as an HTTP error.

use crate::handler::{Error, ErrorKind};
use crate::service::AuthError;

impl From<AuthError> for Error<'static> {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput(errors) => ErrorKind::BadRequest
                .with_message("Username and password are required")
                .with_context(errors.to_string()),
            AuthError::AccountExists => {
                ErrorKind::Conflict.with_message("Account already exists")
            }
            // Same body for an unknown name and a wrong password.
            AuthError::InvalidCredentials => ErrorKind::Unauthorized.into_error(),
            AuthError::InternalFailure(source) => {
                ErrorKind::InternalServerError.with_context(source.to_string())
            }
        }
    }
}
