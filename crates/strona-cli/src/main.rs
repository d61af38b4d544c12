#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process::ExitCode;

use anyhow::Context;
use axum::Router;
use strona_server::handler::routes;
use strona_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use strona_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

pub const TRACING_TARGET_SERVER_STARTUP: &str = "strona_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "strona_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "strona_cli::config";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => {
            tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "stopped");
            ExitCode::SUCCESS
        }
        Err(error) => {
            // Tracing may not be installed yet if startup failed early.
            if tracing::dispatcher::has_been_set() {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = format!("{error:#}"),
                    "stopped with an error"
                );
            } else {
                eprintln!("strona: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("cannot initialize the credential store")?;

    server::serve(app(state, &cli.middleware), cli.server).await?;
    Ok(())
}

/// Routes wrapped in observability, then recovery (outermost).
fn app(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
