//! Listener address and shutdown drain.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Result as AnyhowResult, bail};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Longest accepted shutdown drain, in seconds.
const MAX_SHUTDOWN_TIMEOUT: u64 = 600;

/// Where the page server listens and how long it drains on shutdown.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to listen on; `0.0.0.0` exposes the site on every interface.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port visitors connect to.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight personalizations get to finish after a shutdown
    /// signal.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 90)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Rejects a random port and drains outside 1 to 600 seconds.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port == 0 {
            bail!("port 0 would pick a random port; visitors need a fixed one");
        }

        if !(1..=MAX_SHUTDOWN_TIMEOUT).contains(&self.shutdown_timeout) {
            bail!(
                "shutdown timeout must be between 1 and {MAX_SHUTDOWN_TIMEOUT} seconds, got {}",
                self.shutdown_timeout
            );
        }

        Ok(())
    }

    /// Returns the address to bind.
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the URL of the served page.
    pub fn page_url(&self) -> String {
        format!("http://{}/", self.server_addr())
    }

    /// Returns the shutdown drain.
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Logs the listener settings.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shutdown_timeout: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn random_port_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("random port"));
    }

    #[test]
    fn drain_must_be_bounded() {
        let drain = |shutdown_timeout| ServerConfig {
            shutdown_timeout,
            ..ServerConfig::default()
        };

        assert!(drain(0).validate().is_err());
        assert!(drain(601).validate().is_err());
        assert!(drain(1).validate().is_ok());
        assert!(drain(600).validate().is_ok());
    }

    #[test]
    fn page_url_brackets_ipv6_hosts() {
        assert_eq!(ServerConfig::default().page_url(), "http://127.0.0.1:3000/");

        let config = ServerConfig {
            host: IpAddr::V6(Ipv6Addr::LOCALHOST),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.page_url(), "http://[::1]:8080/");
    }
}
