//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, body limit, request timeout
//! ├── service: ServiceConfig        # Site and users directories, cookies
//! └── rig: RigConfig                # Completion provider, model, API key
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
pub use server::ServerConfig;
use tailor_rig::RigConfig;
use tailor_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tailor")]
#[command(about = "Serves pages that visitors personalize in plain language")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, body limit, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Site, storage and session configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Completion provider configuration.
    #[clap(flatten)]
    pub rig: RigConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so clap can use its values as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        self.rig
            .validate()
            .context("invalid completion provider configuration")?;
        Ok(())
    }

    /// Returns true if the shutdown drain outlasts the request timeout, so
    /// a personalization in flight at shutdown can still finish.
    pub fn drain_covers_requests(&self) -> bool {
        self.server.shutdown_timeout >= self.middleware.recovery.request_timeout
    }

    /// Logs configuration (no API keys).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        if !self.drain_covers_requests() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                shutdown_timeout_secs = self.server.shutdown_timeout,
                request_timeout_secs = self.middleware.recovery.request_timeout,
                "Shutdown drain is shorter than the request timeout; personalizations may be cut off"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            site_dir = %self.service.site_dir.display(),
            users_dir = %self.service.users_dir.display(),
            cookie_secure = self.service.cookie_secure,
            cookie_max_age = self.service.cookie_max_age,
            protected_classes = ?self.service.protected_classes,
            screening_policy = ?self.service.screening_policy,
            "Service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = %self.rig.provider,
            model = ?self.rig.model,
            temperature = ?self.rig.temperature,
            "Completion provider configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
