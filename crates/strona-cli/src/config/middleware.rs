//! Settings for the layers wrapped around the router.

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};
use strona_server::middleware::RecoveryConfig;

use crate::TRACING_TARGET_CONFIG;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        ensure!(
            (1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout),
            "REQUEST_TIMEOUT {timeout}s is outside 1..={MAX_REQUEST_TIMEOUT_SECS}s"
        );
        Ok(())
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "middleware settings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_is_bounded() {
        let config = |secs| MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(secs),
        };

        assert!(config(30).validate().is_ok());
        assert!(config(0).validate().is_err());
        assert!(config(301).validate().is_err());
    }
}
