use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use strona_postgres::{PgClient, PgClientExt, PgConfig};

use crate::service::{HasherConfig, PasswordHasher};
use crate::{Error, Result};

/// Tracing target for service configuration.
const TRACING_TARGET_CONFIG: &str = "strona_server::service::config";

/// Default values for configuration options.
mod defaults {
    /// Default timeout for a single credential store call, in seconds.
    pub const STORE_TIMEOUT_SECS: u64 = 5;

    /// Default lifetime of a cached health check result, in seconds.
    pub const HEALTH_CACHE_SECS: u64 = 30;
}

const MAX_STORE_TIMEOUT_SECS: u64 = 60;
const MAX_HEALTH_CACHE_SECS: u64 = 3600;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Credential store connection pool.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// Password hasher work factor.
    #[cfg_attr(feature = "config", command(flatten))]
    pub hasher: HasherConfig,

    /// Timeout in seconds for each credential store call.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = defaults::STORE_TIMEOUT_SECS)
    )]
    pub store_timeout_secs: u64,

    /// Seconds a health check result is reused before the store is pinged again.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HEALTH_CACHE_SECS", default_value_t = defaults::HEALTH_CACHE_SECS)
    )]
    pub health_cache_secs: u64,
}

impl ServiceConfig {
    /// Creates a new configuration with default service settings.
    pub fn new(postgres: PgConfig) -> Self {
        Self {
            postgres,
            hasher: HasherConfig::default(),
            store_timeout_secs: defaults::STORE_TIMEOUT_SECS,
            health_cache_secs: defaults::HEALTH_CACHE_SECS,
        }
    }

    /// Sets the password hasher work factor.
    pub fn with_hasher(mut self, hasher: HasherConfig) -> Self {
        self.hasher = hasher;
        self
    }

    /// Sets the credential store call timeout in seconds.
    pub fn with_store_timeout_secs(mut self, secs: u64) -> Self {
        self.store_timeout_secs = secs;
        self
    }

    /// Sets how many seconds a health check result is reused.
    pub fn with_health_cache_secs(mut self, secs: u64) -> Self {
        self.health_cache_secs = secs;
        self
    }

    /// Returns the credential store call timeout.
    #[inline]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Returns how long a health check result is reused.
    #[inline]
    pub fn health_cache_duration(&self) -> Duration {
        Duration::from_secs(self.health_cache_secs)
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - the Postgres pool settings are out of range
    /// - the store timeout is not between 1 and 60 seconds
    /// - the health cache lifetime is not between 1 and 3600 seconds
    /// - Argon2 rejects the hasher work factor
    pub fn validate(&self) -> Result<()> {
        self.postgres.validate()?;

        if !(1..=MAX_STORE_TIMEOUT_SECS).contains(&self.store_timeout_secs) {
            return Err(Error::config(format!(
                "store_timeout_secs must be between 1 and {MAX_STORE_TIMEOUT_SECS}"
            )));
        }

        if !(1..=MAX_HEALTH_CACHE_SECS).contains(&self.health_cache_secs) {
            return Err(Error::config(format!(
                "health_cache_secs must be between 1 and {MAX_HEALTH_CACHE_SECS}"
            )));
        }

        self.hasher
            .params()
            .map_err(|e| Error::config("invalid password hasher work factor").with_source(e))?;

        Ok(())
    }

    /// Connects to Postgres, applies pending migrations and checks the schema.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new_with_test(self.postgres.clone())
            .await
            .map_err(|e| {
                Error::external("postgres", "Failed to connect to database").with_source(e)
            })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::internal("postgres", "Failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            applied = migrations.processed_versions.len(),
            duration_ms = migrations.duration.as_millis() as u64,
            "database migrations applied"
        );

        pg_client.verify_schema_integrity().await.map_err(|e| {
            Error::internal("postgres", "Database schema is incomplete").with_source(e)
        })?;

        Ok(pg_client)
    }

    /// Builds the password hasher for the configured work factor.
    pub fn password_hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::new(&self.hasher)
            .map_err(|e| Error::config("Failed to build password hasher").with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn config() -> ServiceConfig {
        ServiceConfig::new(PgConfig::new("postgresql://localhost/strona"))
    }

    #[test]
    fn defaults() {
        let config = config();
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
        assert_eq!(config.health_cache_duration(), Duration::from_secs(30));
        assert_eq!(config.hasher, HasherConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn store_timeout_is_bounded() {
        let error = config()
            .with_store_timeout_secs(0)
            .validate()
            .expect_err("zero timeout is rejected");
        assert_eq!(error.kind(), ErrorKind::Config);

        assert!(config().with_store_timeout_secs(61).validate().is_err());
        assert!(config().with_store_timeout_secs(60).validate().is_ok());
    }

    #[test]
    fn health_cache_lifetime_is_bounded() {
        let error = config()
            .with_health_cache_secs(0)
            .validate()
            .expect_err("zero lifetime is rejected");
        assert_eq!(error.kind(), ErrorKind::Config);

        assert!(config().with_health_cache_secs(1).validate().is_ok());
        assert!(config().with_health_cache_secs(3600).validate().is_ok());
        assert!(config().with_health_cache_secs(3601).validate().is_err());
    }

    #[test]
    fn hasher_work_factor_is_validated() {
        let error = config()
            .with_hasher(HasherConfig::new(4, 1, 1))
            .validate()
            .expect_err("4 KiB is below the Argon2 minimum");
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn postgres_settings_are_validated() {
        let config =
            ServiceConfig::new(PgConfig::new("postgresql://localhost/strona").with_max_connections(1));
        let error = config.validate().expect_err("pool too small");
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn password_hasher_uses_configured_work_factor() -> anyhow::Result<()> {
        let hasher = config()
            .with_hasher(HasherConfig::new(8, 1, 1))
            .password_hasher()?;
        assert_eq!(hasher.config().hasher_memory_kib, 8);
        Ok(())
    }
}
