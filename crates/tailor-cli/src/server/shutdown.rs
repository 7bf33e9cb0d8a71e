//! Shutdown signals and the bounded drain that follows them.

use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never resolves, so a broken signal
/// setup does not stop the server.
async fn wait_for_stop() -> StopSignal {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => StopSignal::Interrupt,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for Ctrl+C"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                StopSignal::Terminate
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "Cannot listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<StopSignal>();

    tokio::select! {
        stop = interrupt => stop,
        stop = terminate => stop,
    }
}

/// Waits for a stop signal, then gives in-flight personalizations `drain`
/// to finish before the process exits.
pub async fn shutdown_signal(drain: Duration) {
    let stop = wait_for_stop().await;

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = stop.name(),
        drain_secs = drain.as_secs(),
        "Stopping; no new requests are accepted"
    );

    tokio::spawn(async move {
        tokio::time::sleep(drain).await;
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Requests still running after the drain period; exiting"
        );
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_use_their_unix_names() {
        assert_eq!(StopSignal::Interrupt.name(), "SIGINT");
        assert_eq!(StopSignal::Terminate.name(), "SIGTERM");
    }
}
