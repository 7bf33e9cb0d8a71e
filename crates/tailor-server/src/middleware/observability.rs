//! Observability middleware for request tracing and timing.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::header::{self, HeaderName};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Tracing target for request timing.
const TRACING_TARGET: &str = "tailor_server::observability";

/// Header carrying the per-request identifier.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers observability middleware for request tracing and logging.
    ///
    /// Generates a request ID, opens a tracing span for each request, echoes
    /// the ID on the response and redacts the session cookie in logs.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(from_fn(track_request_timing))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID_HEADER,
            )))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(REQUEST_ID_HEADER),
                MakeRequestUuid,
            ))
    }
}

/// Logs method, path, status and duration of every request.
async fn track_request_timing(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    tracing::debug!(
        target: TRACING_TARGET,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start_time.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
