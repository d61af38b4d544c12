//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use strona_server::handler::routes;
//! use strona_server::service::{ServiceConfig, ServiceState};
//! use strona_postgres::PgConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::new(PgConfig::new("postgresql://localhost/strona"));
//! let state = ServiceState::from_config(&config).await?;
//!
//! let app: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod monitors;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::Credentials;
pub use crate::handler::response::{AuthResponse, ErrorResponse, HealthResponse};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route of the server and a JSON 404
/// fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .merge(monitors::routes())
        .fallback(handler)
}
