//! Plain HTTP listener.

use std::future::Future;
use std::io;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

use super::{ServerError, ServerResult, shutdown_signal};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves `app` on the configured address until a termination signal, then
/// waits at most `SHUTDOWN_TIMEOUT` for open requests.
pub async fn serve(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        let error = ServerError::Bind {
            address: server_addr.to_string(),
            source,
        };
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %error,
            suggestion = error.suggestion(),
            "bind failed"
        );
        error
    })?;

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "listening on every interface"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "listening"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let signal = async move {
        shutdown_signal(shutdown_timeout).await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(signal);
    let forced_stop = async move {
        if drain_rx.await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    run_until_drained(server.into_future(), forced_stop).await
}

async fn run_until_drained<S, F>(server: S, forced_stop: F) -> ServerResult<()>
where
    S: Future<Output = io::Result<()>>,
    F: Future<Output = ()>,
{
    let started = Instant::now();

    tokio::select! {
        result = server => {
            result.map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    uptime_secs = started.elapsed().as_secs(),
                    "server failed"
                );
                ServerError::Runtime(err)
            })?;

            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = started.elapsed().as_secs(),
                "all requests drained"
            );
        }
        () = forced_stop => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = started.elapsed().as_secs(),
                "grace period over, abandoning open requests"
            );
        }
    }

    Ok(())
}
