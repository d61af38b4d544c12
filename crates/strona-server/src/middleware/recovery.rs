//! Request timeouts and panic recovery.
//!
//! Both conditions are answered with the server's JSON error body instead of
//! a dropped connection.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower::{BoxError, ServiceBuilder};
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET_RECOVERY: &str = "strona_server::middleware::recovery";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Whole-request deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may run before the server gives up and answers 500.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)
    )]
    pub request_timeout: u64,
}

impl RecoveryConfig {
    pub fn with_timeout_secs(request_timeout: u64) -> Self {
        Self { request_timeout }
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

/// Adds the request deadline and panic catching to a [`Router`].
pub trait RouterRecoveryExt<S> {
    fn with_recovery(self, config: &RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        guard(self, config.request_timeout())
    }
}

fn guard<S>(router: Router<S>, deadline: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Outermost first: the error handler must see the timeout's Elapsed.
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(middleware_failure))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(deadline)),
    )
}

async fn middleware_failure(err: BoxError) -> Response {
    let error = match err.downcast_ref::<Elapsed>() {
        Some(_) => {
            tracing::error!(target: TRACING_TARGET_RECOVERY, "request deadline exceeded");
            ErrorKind::InternalServerError
                .with_message("Request timeout")
                .with_context("request deadline exceeded")
        }
        None => {
            tracing::error!(target: TRACING_TARGET_RECOVERY, error = %err, "middleware failure");
            ErrorKind::InternalServerError.with_context(err.to_string())
        }
    };

    error.into_response()
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    if let Some(error) = payload.downcast_ref::<Error<'static>>() {
        tracing::error!(target: TRACING_TARGET_RECOVERY, %error, "handler panicked");
        return error.clone().into_response();
    }

    let detail = match payload.downcast_ref::<String>() {
        Some(text) => text.as_str(),
        None => payload.downcast_ref::<&str>().copied().unwrap_or("<non-string payload>"),
    };
    tracing::error!(target: TRACING_TARGET_RECOVERY, detail, "handler panicked");

    ErrorKind::InternalServerError.into_response()
}
