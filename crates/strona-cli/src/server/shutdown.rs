//! Termination signals.

use std::future::pending;
use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Completes on Ctrl+C, or SIGTERM on Unix.
///
/// A signal whose handler cannot be installed is logged and then never
/// fires; the other one still does.
pub async fn shutdown_signal(grace: Duration) {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(target: TRACING_TARGET_SERVER_SHUTDOWN, %error, "no Ctrl+C handler");
            pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(target: TRACING_TARGET_SERVER_SHUTDOWN, %error, "no SIGTERM handler");
                pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = received,
        grace_secs = grace.as_secs(),
        "draining in-flight requests"
    );
}
