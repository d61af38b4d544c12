//! Application state and dependency injection.

mod auth;
mod cache;
mod config;
mod security;

use std::sync::Arc;
use std::time::Duration;

pub use crate::service::auth::{
    AuthError, AuthOutcome, AuthService, CredentialStore, MIN_PASSWORD_LEN, StoreError,
    StoredAccount,
};
pub use crate::service::cache::HealthCache;
pub use crate::service::config::ServiceConfig;
pub use crate::service::security::{HasherConfig, HasherError, PasswordHasher};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

#[cfg(test)]
pub(crate) use crate::service::auth::test_stores;

/// Tracing target for application state assembly.
const TRACING_TARGET_STATE: &str = "strona_server::service::state";

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pub auth_service: AuthService,
    pub health_cache: HealthCache,
}

impl ServiceState {
    /// Assembles the state around an already constructed credential store.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        password_hasher: PasswordHasher,
        store_timeout: Duration,
        health_cache: HealthCache,
    ) -> Self {
        Self {
            auth_service: AuthService::new(store, password_hasher, store_timeout),
            health_cache,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Validates the configuration, connects to Postgres and applies the
    /// embedded migrations.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        service_config.validate()?;

        let postgres = service_config.connect_postgres().await?;
        let password_hasher = service_config.password_hasher()?;

        tracing::info!(
            target: TRACING_TARGET_STATE,
            store_timeout_secs = service_config.store_timeout_secs,
            "service state initialized"
        );

        Ok(Self::new(
            Arc::new(postgres),
            password_hasher,
            service_config.store_timeout(),
            HealthCache::with_cache_duration(service_config.health_cache_duration()),
        ))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(auth_service: AuthService);
impl_di!(health_cache: HealthCache);
