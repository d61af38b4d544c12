use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

const TRACING_TARGET_RESPONSE: &str = "strona_server::handler::response";

/// Body of every non-2xx reply: `{"name": "...", "message": "..."}`.
///
/// `context` and `status` stay on the server side. The context ends up in the
/// warning logged when the body is rendered.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse<'a> {
    /// Stable snake_case identifier of the failure class.
    pub name: Cow<'a, str>,
    /// Text shown to the client.
    pub message: Cow<'a, str>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    pub const BAD_REQUEST: Self = Self::template(
        StatusCode::BAD_REQUEST,
        "bad_request",
        "Invalid request data.",
    );
    pub const UNAUTHORIZED: Self = Self::template(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "Invalid credentials.",
    );
    pub const NOT_FOUND: Self =
        Self::template(StatusCode::NOT_FOUND, "not_found", "Resource not found.");
    pub const CONFLICT: Self = Self::template(
        StatusCode::CONFLICT,
        "conflict",
        "Resource state conflict.",
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::template(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_server_error",
        "Internal server error.",
    );
    pub const SERVICE_UNAVAILABLE: Self = Self::template(
        StatusCode::SERVICE_UNAVAILABLE,
        "service_unavailable",
        "Service unavailable.",
    );

    const fn template(status: StatusCode, name: &'a str, message: &'a str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            context: None,
            status,
        }
    }

    /// Extends the client message: `"Base text. <detail>"`.
    pub fn with_message(mut self, detail: impl Into<Cow<'a, str>>) -> Self {
        let detail = detail.into();
        let mut joined = self.message.trim_end_matches('.').to_owned();
        joined.push_str(". ");
        joined.push_str(&detail);
        self.message = Cow::Owned(joined);
        self
    }

    /// Adds a log-only note. Repeated notes are separated by `"; "`.
    pub fn with_context(mut self, note: impl Into<Cow<'a, str>>) -> Self {
        let note = note.into();
        self.context = match self.context.take() {
            None => Some(note),
            Some(prev) => Some(Cow::Owned(format!("{prev}; {note}"))),
        };
        self
    }
}

impl Default for ErrorResponse<'_> {
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: TRACING_TARGET_RESPONSE,
            status = self.status.as_u16(),
            name = %self.name,
            message = %self.message,
            context = self.context.as_deref().unwrap_or("-"),
            "request rejected"
        );

        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_accumulate_after_the_base_text() {
        let response = ErrorResponse::BAD_REQUEST
            .with_message("Invalid format")
            .with_message("Missing required field");

        assert_eq!(
            response.message,
            "Invalid request data. Invalid format. Missing required field"
        );
    }

    #[test]
    fn context_notes_are_joined() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("Database connection failed")
            .with_context("Pool wait timed out");

        assert_eq!(
            response.context.as_deref(),
            Some("Database connection failed; Pool wait timed out")
        );
    }

    #[test]
    fn only_name_and_message_are_serialized() -> anyhow::Result<()> {
        let response = ErrorResponse::CONFLICT
            .with_message("Account already exists")
            .with_context("users_name_unique");

        let json = serde_json::to_value(&response)?;
        assert_eq!(
            json,
            serde_json::json!({
                "name": "conflict",
                "message": "Resource state conflict. Account already exists",
            })
        );

        Ok(())
    }
}
