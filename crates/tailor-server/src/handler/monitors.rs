//! System health monitoring handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;

use super::response::MonitorStatus;
use crate::extract::Json;
use crate::service::{PageStore, ServiceState};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "tailor_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(State(page_store): State<PageStore>) -> (StatusCode, Json<MonitorStatus>) {
    let is_healthy = page_store.is_healthy().await;

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        is_healthy = is_healthy,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    (status_code, Json(MonitorStatus::now(is_healthy)))
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use tailor_engine::mock::MockGenerator;

    use super::*;
    use crate::handler::test::create_test_site;
    use crate::service::PAGE_FILE_NAME;

    #[tokio::test]
    async fn health_status_is_healthy() -> anyhow::Result<()> {
        let site = create_test_site(MockGenerator::respond("{}")).await?;
        let server = site.server(routes())?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let status = response.json::<MonitorStatus>();
        assert!(status.is_healthy);
        assert!(status.updated_at > Timestamp::now() - 1.minute());

        Ok(())
    }

    #[tokio::test]
    async fn health_status_without_base_page() -> anyhow::Result<()> {
        let site = create_test_site(MockGenerator::respond("{}")).await?;
        let server = site.server(routes())?;

        std::fs::remove_file(site.state.page_store.site_dir().join(PAGE_FILE_NAME))?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert!(!response.json::<MonitorStatus>().is_healthy);

        Ok(())
    }
}
