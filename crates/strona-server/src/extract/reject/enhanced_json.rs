//! JSON extractor with the server's error rendering.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

const TRACING_TARGET_JSON: &str = "strona_server::extract::json";

/// JSON body extractor whose rejection is a 400 [`Error`] in the server's
/// error format. Serializes like [`axum::Json`] when returned.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(target: TRACING_TARGET_JSON, %rejection, "rejected json body");

        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                return ErrorKind::BadRequest
                    .with_message("Expected an application/json body")
                    .with_context("missing or wrong content type");
            }
            JsonRejection::JsonSyntaxError(_) => "Body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Body does not match the expected shape",
            JsonRejection::BytesRejection(_) => "Body could not be read",
            _ => "Body was rejected",
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_context(sanitize_error_message(&rejection.body_text()))
    }
}
