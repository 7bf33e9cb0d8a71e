//! Serving the page router until a shutdown signal arrives.

mod shutdown;

use std::io;
use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until shutdown.
///
/// # Errors
///
/// Fails when the address cannot be bound, with a hint for the usual
/// causes, or when the server stops on an I/O error.
pub async fn serve(app: Router, config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.server_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| bind_error(err, addr))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        url = %config.page_url(),
        "Serving personalized pages"
    );

    let started = Instant::now();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await;

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = started.elapsed().as_secs(),
        clean = result.is_ok(),
        "Server stopped"
    );

    result.context("server stopped on an I/O error")
}

/// Wraps a bind failure with the address and a hint, when one applies.
fn bind_error(err: io::Error, addr: SocketAddr) -> anyhow::Error {
    let hint = match err.kind() {
        io::ErrorKind::AddrInUse => "; another process holds the port, pass a different --port",
        io::ErrorKind::PermissionDenied => "; ports below 1024 need elevated privileges",
        io::ErrorKind::AddrNotAvailable => "; HOST is not an address of this machine",
        _ => "",
    };

    anyhow::Error::new(err).context(format!("cannot listen on {addr}{hint}"))
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[tokio::test]
    async fn occupied_port_is_reported_with_a_hint() -> anyhow::Result<()> {
        let holder = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: holder.local_addr()?.port(),
            ..ServerConfig::default()
        };

        let error = serve(Router::new(), config).await.unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("cannot listen on 127.0.0.1:"));
        assert!(message.contains("--port"));

        let source = error.downcast_ref::<io::Error>().map(io::Error::kind);
        assert_eq!(source, Some(io::ErrorKind::AddrInUse));

        Ok(())
    }

    #[test]
    fn unknown_bind_failures_carry_no_hint() {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 3000));
        let error = bind_error(io::Error::other("boom"), addr);
        assert_eq!(error.to_string(), "cannot listen on 127.0.0.1:3000");
    }
}
