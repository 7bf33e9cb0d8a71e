//! Security middleware for HTTP request protection.
//!
//! Applies CORS rules, a handful of response security headers and a limit
//! on request body size.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Default maximum request body size: 16 MiB.
const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers security middlewares with the provided configurations.
    fn with_security(self, cors: &CorsConfig, security: &SecurityConfig) -> Self;

    /// Layers security middlewares with default configurations.
    ///
    /// Uses development-friendly CORS settings. For production deployments,
    /// prefer `with_security` with explicit configuration.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, security: &SecurityConfig) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        self.layer(DefaultBodyLimit::max(security.max_body_size))
            .layer(RequestBodyLimitLayer::new(security.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default(), &SecurityConfig::default())
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, defaults to localhost origins for development.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "true")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, falling back to localhost.
    ///
    /// Origins that are not valid header values are skipped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        if self.allowed_origins.is_empty() {
            return vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:8080"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:8080"),
            ];
        }

        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    }
}

/// Request limits applied to every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_BODY_SIZE", default_value = "16777216")
    )]
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum_test::TestServer;

    use super::*;

    async fn echo(body: Bytes) -> Bytes {
        body
    }

    #[test]
    fn origins_fall_back_to_localhost() {
        let config = CorsConfig::default();
        let origins = config.to_header_values();
        assert!(origins.contains(&HeaderValue::from_static("http://localhost:3000")));
    }

    #[test]
    fn invalid_origins_are_skipped() {
        let config = CorsConfig {
            allowed_origins: vec!["https://example.com".to_owned(), "bad\norigin".to_owned()],
            ..CorsConfig::default()
        };

        let origins = config.to_header_values();
        assert_eq!(origins, vec![HeaderValue::from_static("https://example.com")]);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
        let security = SecurityConfig { max_body_size: 8 };
        let app = Router::new()
            .route("/echo", post(echo))
            .with_security(&CorsConfig::default(), &security);
        let server = TestServer::new(app)?;

        server.post("/echo").text("short").await.assert_status_ok();
        server
            .post("/echo")
            .text("far too long for the limit")
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        Ok(())
    }

    #[tokio::test]
    async fn security_headers_are_set() -> anyhow::Result<()> {
        let app = Router::new()
            .route("/echo", post(echo))
            .with_default_security();
        let server = TestServer::new(app)?;

        let response = server.post("/echo").text("hi").await;
        assert_eq!(response.header(header::X_CONTENT_TYPE_OPTIONS), "nosniff");

        Ok(())
    }
}
