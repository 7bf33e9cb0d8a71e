//! Middleware configuration for the HTTP server.
//!
//! All middleware configs are re-exported from `tailor-server` and support
//! both CLI arguments and environment variables.
//!
//! # Example
//!
//! ```bash
//! tailor --cors-origins "https://example.com" --request-timeout 90
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use tailor_server::middleware::{CorsConfig, RecoveryConfig, SecurityConfig};

use super::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS, request limits and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request body limits.
    #[clap(flatten)]
    pub security: SecurityConfig,

    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Validates middleware configuration values.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.recovery.request_timeout == 0 || self.recovery.request_timeout > 600 {
            return Err(anyhow!(
                "Request timeout {} seconds is invalid. Must be between 1 and 600 seconds.",
                self.recovery.request_timeout
            ));
        }

        if self.security.max_body_size == 0 {
            return Err(anyhow!("Maximum body size must be greater than 0"));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_body_size = self.security.max_body_size,
            request_timeout_secs = self.recovery.request_timeout,
            "Request limits"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn reject_invalid_limits() {
        let mut config = MiddlewareConfig::default();
        config.recovery.request_timeout = 0;
        assert!(config.validate().is_err());

        let mut config = MiddlewareConfig::default();
        config.security.max_body_size = 0;
        assert!(config.validate().is_err());
    }
}
