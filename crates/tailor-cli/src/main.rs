#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tailor_engine::Generator;
use tailor_server::handler::routes;
use tailor_server::middleware::{RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt};
use tailor_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "tailor_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "tailor_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "tailor_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing();

    cli.validate()?;
    cli.log();

    let generator = connect_generator(&cli)?;
    let state = ServiceState::from_config(&cli.service, generator)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Connects the configured completion provider.
fn connect_generator(cli: &Cli) -> anyhow::Result<Arc<dyn Generator>> {
    let provider = cli
        .rig
        .connect()
        .context("failed to connect the completion provider")?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        provider = %provider.provider(),
        model = provider.model_name(),
        "completion provider ready"
    );

    Ok(Arc::new(provider))
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) catches panics and enforces timeouts
/// 2. Observability adds request IDs and tracing spans
/// 3. Security applies CORS and body limits
/// 4. Routes (innermost)
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_state(state)
        .with_security(&middleware.cors, &middleware.security)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
