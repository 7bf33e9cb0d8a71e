//! Recovery from handler panics and slow requests.
//!
//! A request is cut off after [`RecoveryConfig::request_timeout`], which in
//! practice bounds how long a visitor waits on the completion provider. A
//! timed out or panicking `POST /personalize` still answers in the
//! `{accepted: false, error}` shape that endpoint promises; every other route
//! gets the regular JSON error body.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::handler::{Error, ErrorKind};

/// Tracing target for recovered requests.
const TRACING_TARGET: &str = "tailor_server::recovery";

/// Default request timeout in seconds; covers one generation round trip.
const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Path whose failures keep the personalization reply shape.
const PERSONALIZE_PATH: &str = "/personalize";

/// Configuration for recovery middleware behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds a request may run, model round trip included.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value = "60")
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RecoveryConfig {
    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    /// Turns panics and timeouts into JSON error replies.
    fn with_recovery(self, config: &RecoveryConfig) -> Self;

    /// Same as [`with_recovery`] with the default timeout.
    ///
    /// [`with_recovery`]: RouterRecoveryExt::with_recovery
    fn with_default_recovery(self) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        self.layer(from_fn_with_state(config.request_timeout(), recover))
    }

    fn with_default_recovery(self) -> Self {
        self.with_recovery(&RecoveryConfig::default())
    }
}

/// Runs the rest of the stack under a deadline and catches panics.
async fn recover(State(timeout): State<Duration>, request: Request, next: Next) -> Response {
    let personalize = request.method() == Method::POST && request.uri().path() == PERSONALIZE_PATH;
    let path = request.uri().path().to_owned();

    let run = AssertUnwindSafe(next.run(request)).catch_unwind();
    let error = match tokio::time::timeout(timeout, run).await {
        Ok(Ok(response)) => return response,
        Ok(Err(panic)) => {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path,
                panic = panic_message(panic.as_ref()),
                "Handler panicked"
            );
            ErrorKind::InternalServerError.with_message("The request failed unexpectedly")
        }
        Err(_) => {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path,
                timeout_secs = timeout.as_secs(),
                "Request timed out"
            );
            ErrorKind::InternalServerError
                .with_message("The request took too long and was cancelled")
        }
    };

    reply(error, personalize)
}

fn reply(error: Error, personalize: bool) -> Response {
    if personalize {
        let status = error.kind().status_code();
        (status, Json(error.to_personalize_response())).into_response()
    } else {
        error.into_response()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;

    async fn stalls() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    async fn panics() -> &'static str {
        panic!("page store poisoned")
    }

    fn server(timeout: u64) -> anyhow::Result<TestServer> {
        let app = Router::new()
            .route("/", get(|| async { "page" }))
            .route("/stall", get(stalls))
            .route("/panic", get(panics))
            .route(PERSONALIZE_PATH, post(stalls))
            .with_recovery(&RecoveryConfig {
                request_timeout: timeout,
            });
        Ok(TestServer::new(app)?)
    }

    #[tokio::test]
    async fn fast_requests_pass_through() -> anyhow::Result<()> {
        let response = server(5)?.get("/").await;
        response.assert_status_ok();
        response.assert_text("page");
        Ok(())
    }

    #[tokio::test]
    async fn stalled_page_gets_a_json_error() -> anyhow::Result<()> {
        let response = server(0)?.get("/stall").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "internal_server_error");
        assert_eq!(body["message"], "The request took too long and was cancelled");
        Ok(())
    }

    #[tokio::test]
    async fn stalled_personalization_keeps_its_reply_shape() -> anyhow::Result<()> {
        let response = server(0)?.post(PERSONALIZE_PATH).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({
            "accepted": false,
            "error": "The request took too long and was cancelled",
        }));
        Ok(())
    }

    #[tokio::test]
    async fn panics_become_json_errors() -> anyhow::Result<()> {
        let response = server(5)?.get("/panic").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "The request failed unexpectedly");
        Ok(())
    }

    #[test]
    fn panic_payloads_are_readable() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        let borrowed: Box<dyn Any + Send> = Box::new("bang");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(owned.as_ref()), "boom");
        assert_eq!(panic_message(borrowed.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
