//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tailor_engine::Generator;
//! use tailor_server::handler::routes;
//! use tailor_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(generator: Arc<dyn Generator>) -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config, generator).await?;
//! let router: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod pages;
mod personalize;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(personalize::routes())
        .merge(monitors::routes())
        .merge(pages::routes())
        .fallback(handler)
        .method_not_allowed_fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use axum::Router;
    use axum_test::TestServer;
    use tailor_engine::mock::MockGenerator;
    use tempfile::TempDir;

    use crate::handler::routes;
    use crate::service::{PAGE_FILE_NAME, ServiceConfig, ServiceState};

    /// Base page of every test site.
    pub const BASE_PAGE: &str =
        "<html>\n<h1>Base</h1>\n<div class=\"input-bar\"><input></div>\n</html>";

    /// A site on disk with state wired to a scripted generator.
    pub struct TestSite {
        pub state: ServiceState,
        pub generator: Arc<MockGenerator>,
        _root: TempDir,
    }

    impl TestSite {
        /// Returns a new [`TestServer`] with the given router and this state.
        pub fn server(&self, router: Router<ServiceState>) -> anyhow::Result<TestServer> {
            create_test_server_with_state(router, self.state.clone())
        }
    }

    /// Creates a site with a base page, a stylesheet and a text file.
    pub async fn create_test_site(generator: MockGenerator) -> anyhow::Result<TestSite> {
        let root = TempDir::new()?;
        let site_dir = root.path().join("site");
        std::fs::create_dir_all(site_dir.join("css"))?;
        std::fs::write(site_dir.join(PAGE_FILE_NAME), BASE_PAGE)?;
        std::fs::write(site_dir.join("css/site.css"), "h1 { color: black; }")?;
        std::fs::write(site_dir.join("notes.txt"), "private")?;

        let config = ServiceConfig::builder()
            .with_site_dir(site_dir)
            .with_users_dir(root.path().join("users"))
            .build()?;

        let generator = Arc::new(generator);
        let state = ServiceState::from_config(&config, generator.clone()).await?;

        Ok(TestSite {
            state,
            generator,
            _root: root,
        })
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with all routes.
    pub async fn create_test_server() -> anyhow::Result<(TestSite, TestServer)> {
        let site = create_test_site(MockGenerator::respond("{}")).await?;
        let server = site.server(routes())?;
        Ok((site, server))
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let (_site, server) = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_routes_are_json_not_found() -> anyhow::Result<()> {
        let (_site, server) = create_test_server().await?;

        let response = server.put("/personalize").await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");

        Ok(())
    }

    #[tokio::test]
    async fn routes_do_not_shadow_each_other() -> anyhow::Result<()> {
        let (_site, server) = create_test_server().await?;

        server.get("/health").await.assert_status_ok();
        server.get("/").await.assert_status_ok();
        server.get("/css/site.css").await.assert_status_ok();

        Ok(())
    }
}
