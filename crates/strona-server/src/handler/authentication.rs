//! Account registration and login handlers.
//!
//! Both routes accept a urlencoded form or a JSON body with `username` and
//! `password`, delegate to [`AuthService`] and render its outcome.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{FormOrJson, Json};
use crate::handler::request::Credentials;
use crate::handler::response::AuthResponse;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AuthError, AuthService, MIN_PASSWORD_LEN, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "strona_server::handler::authentication";

/// Creates a new account.
#[tracing::instrument(skip_all)]
async fn register(
    State(auth_service): State<AuthService>,
    FormOrJson(request): FormOrJson<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        username = %request.username,
        "registration requested"
    );

    let outcome = auth_service
        .register(request.username, request.password)
        .await
        .map_err(|error| match error {
            AuthError::InvalidInput(errors) => ErrorKind::BadRequest
                .with_message(format!(
                    "Username must not be empty and password must be at least \
                     {MIN_PASSWORD_LEN} characters"
                ))
                .with_context(errors.to_string()),
            other => Error::from(other),
        })?;

    tracing::info!(
        target: TRACING_TARGET,
        username = %outcome.name(),
        "account registered"
    );

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Checks a username and password against the stored account.
#[tracing::instrument(skip_all)]
async fn login(
    State(auth_service): State<AuthService>,
    FormOrJson(request): FormOrJson<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let outcome = auth_service
        .authenticate(request.username, request.password)
        .await
        .inspect_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = error.as_str(),
                "login rejected"
            );
        })?;

    tracing::info!(
        target: TRACING_TARGET,
        username = %outcome.name(),
        "login succeeded"
    );

    Ok((StatusCode::OK, Json(outcome.into())))
}

/// Returns a [`Router`] with the registration and login routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
