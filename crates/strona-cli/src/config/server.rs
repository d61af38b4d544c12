//! Listener address and shutdown grace period.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SHUTDOWN_SECS: u64 = 30;
const SHUTDOWN_RANGE: RangeInclusive<u64> = 1..=300;

/// Where to listen and how long to drain on shutdown.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Interface to bind; `0.0.0.0` exposes the server on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind, 1024 or above.
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = DEFAULT_SHUTDOWN_SECS)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.port >= 1024,
            "PORT {} is privileged; pick a port between 1024 and 65535",
            self.port
        );
        ensure!(
            SHUTDOWN_RANGE.contains(&self.shutdown_timeout),
            "SHUTDOWN_TIMEOUT {}s is outside {}..={}s",
            self.shutdown_timeout,
            SHUTDOWN_RANGE.start(),
            SHUTDOWN_RANGE.end()
        );
        Ok(())
    }

    #[inline]
    pub fn server_addr(&self) -> SocketAddr {
        (self.host, self.port).into()
    }

    #[inline]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// `0.0.0.0` or `::`.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "listener settings"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST.into(),
            port: DEFAULT_PORT,
            shutdown_timeout: DEFAULT_SHUTDOWN_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_loopback() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.binds_to_all_interfaces());
        assert_eq!(config.server_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn privileged_port_is_rejected() {
        let config = ServerConfig {
            port: 80,
            ..ServerConfig::default()
        };
        let message = config.validate().expect_err("port 80").to_string();
        assert!(message.contains("PORT 80"));
    }

    #[test]
    fn shutdown_timeout_bounds() {
        let with = |shutdown_timeout| ServerConfig {
            shutdown_timeout,
            ..ServerConfig::default()
        };
        assert!(with(0).validate().is_err());
        assert!(with(1).validate().is_ok());
        assert!(with(300).validate().is_ok());
        assert!(with(301).validate().is_err());
    }

    #[test]
    fn unspecified_hosts_bind_everything() {
        for host in [Ipv4Addr::UNSPECIFIED.into(), IpAddr::from([0u16; 8])] {
            let config = ServerConfig {
                host,
                ..ServerConfig::default()
            };
            assert!(config.binds_to_all_interfaces());
        }
    }
}
