//! Form extractor with the server's error rendering.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form as AxumForm, FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// Tracing target for form extraction.
const TRACING_TARGET_FORM: &str = "strona_server::extract::form";

/// [`axum::Form`] with rejections rendered as [`Error`].
///
/// Expects an `application/x-www-form-urlencoded` body.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Form<T>(pub T);

impl<T> Form<T> {
    /// Creates a new [`Form`] wrapper around the provided form data.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes the wrapper and returns the inner form data.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Form<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumForm::<T>::from_request(req, state).await {
            Ok(AxumForm(form)) => Ok(Self(form)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<FormRejection> for Error<'static> {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_FORM,
            error = %rejection,
            "form body rejected"
        );

        match rejection {
            FormRejection::FailedToDeserializeForm(err) => deserialize_error(err.body_text()),
            FormRejection::FailedToDeserializeFormBody(err) => deserialize_error(err.body_text()),
            FormRejection::InvalidFormContentType(_) => ErrorKind::BadRequest
                .with_message("Invalid content type")
                .with_context(
                    "expected Content-Type: application/x-www-form-urlencoded or application/json",
                ),
            other => ErrorKind::BadRequest
                .with_message("Failed to read form data")
                .with_context(sanitize_error_message(&other.body_text())),
        }
    }
}

fn deserialize_error(detail: String) -> Error<'static> {
    let message = match field_name_from_error(&detail) {
        Some(field) if detail.contains("duplicate field") => {
            format!("Form field '{field}' was given more than once")
        }
        Some(field) => format!("Invalid value for form field '{field}'"),
        None => "Invalid form data".to_owned(),
    };

    ErrorKind::BadRequest
        .with_message(message)
        .with_context(sanitize_error_message(&detail))
}

/// Pulls the backtick-quoted field name out of a serde error message.
fn field_name_from_error(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len]).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_is_read_from_backticks() {
        assert_eq!(
            field_name_from_error("duplicate field `username`"),
            Some("username")
        );
        assert_eq!(
            field_name_from_error("invalid type: found `a`, expected u8"),
            Some("a")
        );
        assert_eq!(field_name_from_error("missing field"), None);
        assert_eq!(field_name_from_error("empty ``"), None);
    }

    #[test]
    fn form_deref() {
        let form = Form::new("alice".to_owned());
        assert_eq!(*form, "alice");
        assert_eq!(form.into_inner(), "alice");
    }
}
