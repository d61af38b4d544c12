//! Handler error: an [`ErrorKind`] plus optional client detail and log context.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Error returned by every handler.
///
/// `message` is appended to the generic text of the kind and reaches the
/// client. `context` is written to the log only.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

/// Handler result; the error defaults to an owned [`Error`].
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

impl Error<'static> {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Replaces the client-facing detail.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replaces the log-only context.
    #[inline]
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Renders the body this error turns into.
    pub fn to_response(&self) -> ErrorResponse<'a> {
        let mut response: ErrorResponse<'a> = self.kind.response();
        if let Some(message) = &self.message {
            response = response.with_message(message.clone());
        }
        if let Some(context) = &self.context {
            response = response.with_context(context.clone());
        }
        response
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind, self.kind.status_code().as_u16())?;
        match &self.message {
            Some(message) => write!(f, " {message}")?,
            None => write!(f, " {}", self.kind.response().message)?,
        }
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Failure classes a handler can answer with.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, the body is missing, malformed or fails validation.
    BadRequest,
    /// 401, unknown user or wrong password.
    Unauthorized,
    /// 404, no route matched.
    NotFound,
    /// 409, the username is taken.
    Conflict,
    /// 500
    #[default]
    InternalServerError,
    /// 503, the credential store cannot be reached.
    ServiceUnavailable,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        self.into_error().with_message(message)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        self.into_error().with_context(context)
    }

    /// Body template for this kind, before any detail is appended.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => ErrorResponse::SERVICE_UNAVAILABLE,
        }
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_kind_is_internal() {
        let error = Error::new(ErrorKind::default());
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn builder_keeps_message_and_context_apart() {
        let error = ErrorKind::Conflict
            .with_message("Account already exists")
            .with_context("users_name_unique");

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.message(), Some("Account already exists"));
        assert_eq!(error.context(), Some("users_name_unique"));

        let body = error.to_response();
        assert_eq!(body.message, "Resource state conflict. Account already exists");
        assert_eq!(body.context.as_deref(), Some("users_name_unique"));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn display_includes_every_part() {
        let rendered = ErrorKind::BadRequest
            .with_message("Malformed body")
            .with_context("expected value at line 1 column 1")
            .to_string();

        assert_eq!(
            rendered,
            "bad_request [400] Malformed body (expected value at line 1 column 1)"
        );
    }

    #[test]
    fn display_falls_back_to_kind_text() {
        assert_eq!(
            ErrorKind::Unauthorized.into_error().to_string(),
            "unauthorized [401] Invalid credentials."
        );
    }

    #[test]
    fn kinds_map_to_status_codes() {
        let expected = [
            (ErrorKind::BadRequest, 400),
            (ErrorKind::Unauthorized, 401),
            (ErrorKind::NotFound, 404),
            (ErrorKind::Conflict, 409),
            (ErrorKind::InternalServerError, 500),
            (ErrorKind::ServiceUnavailable, 503),
        ];
        for (kind, status) in expected {
            assert_eq!(kind.status_code().as_u16(), status, "{kind:?}");
        }
    }
}
