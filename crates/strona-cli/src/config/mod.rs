//! Command line and environment configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # Request timeout
//! └── service: ServiceConfig        # Postgres, hasher, store timeout
//! ```
//!
//! Every option is a flag with an environment variable fallback.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use strona_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "strona")]
#[command(about = "Strona username/password authentication server")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub server: ServerConfig,

    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Parses arguments after loading `.env`, so the file feeds clap's `env`
    /// fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("strona: ignoring unreadable .env: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("server settings")?;
        self.middleware
            .validate()
            .context("middleware settings")?;
        self.service
            .validate()
            .context("service settings")?;
        Ok(())
    }

    /// Logs every setting; the database password is masked.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            "strona starting"
        );

        self.server.log();
        self.middleware.log();

        let ServiceConfig {
            postgres, hasher, ..
        } = &self.service;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            url = %postgres.database_url_masked(),
            max_connections = postgres.postgres_max_connections,
            connection_timeout_secs = postgres.postgres_connection_timeout_secs,
            idle_timeout_secs = postgres.postgres_idle_timeout_secs,
            "postgres settings"
        );
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            memory_kib = hasher.hasher_memory_kib,
            iterations = hasher.hasher_iterations,
            parallelism = hasher.hasher_parallelism,
            store_timeout_secs = self.service.store_timeout_secs,
            health_cache_secs = self.service.health_cache_secs,
            "credential settings"
        );
    }
}
