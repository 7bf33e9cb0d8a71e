//! Service configuration: site and users directories, session cookie,
//! protected classes and an optional screening policy file.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tailor_engine::{PromptTemplate, ScreeningPolicy};

use crate::service::{PageStore, SessionConfig};
use crate::{Error, Result};

/// Tracing target for service configuration.
const TRACING_TARGET: &str = "tailor_server::service::config";

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Default directory holding the base page and its assets.
    pub fn site_dir() -> PathBuf {
        "./site".into()
    }

    /// Default directory holding personalized pages.
    pub fn users_dir() -> PathBuf {
        "./users".into()
    }

    /// Default session cookie lifetime: 30 days.
    pub const COOKIE_MAX_AGE: u64 = 30 * 24 * 60 * 60;

    /// Default protected CSS classes.
    pub fn protected_classes() -> Vec<String> {
        vec![tailor_engine::DEFAULT_PROTECTED_CLASS.to_owned()]
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Directory holding the base `index.html` and its static assets.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SITE_DIR", default_value = "./site")
    )]
    #[builder(default = "defaults::site_dir()")]
    pub site_dir: PathBuf,

    /// Directory holding one personalized page per user.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "USERS_DIR", default_value = "./users")
    )]
    #[builder(default = "defaults::users_dir()")]
    pub users_dir: PathBuf,

    /// Whether the session cookie is only sent over HTTPS.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "COOKIE_SECURE", default_value = "false")
    )]
    #[builder(default)]
    pub cookie_secure: bool,

    /// Session cookie lifetime in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "COOKIE_MAX_AGE", default_value = "2592000")
    )]
    #[builder(default = "defaults::COOKIE_MAX_AGE")]
    pub cookie_max_age: u64,

    /// CSS classes of elements the AI must never modify.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "PROTECTED_CLASSES",
            value_delimiter = ',',
            default_value = "input-bar"
        )
    )]
    #[builder(default = "defaults::protected_classes()")]
    pub protected_classes: Vec<String>,

    /// JSON file replacing the built-in screening policy.
    #[cfg_attr(feature = "config", arg(long, env = "SCREENING_POLICY"))]
    #[builder(default)]
    pub screening_policy: Option<PathBuf>,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.site_dir.as_os_str().is_empty() {
            return Err(Error::config("site directory cannot be empty"));
        }

        if self.users_dir.as_os_str().is_empty() {
            return Err(Error::config("users directory cannot be empty"));
        }

        if self.cookie_max_age == 0 {
            return Err(Error::config("cookie max age must be greater than 0"));
        }

        if self.users_dir == self.site_dir {
            return Err(Error::config(
                "users directory must differ from the site directory",
            ));
        }

        Ok(())
    }

    /// Opens the page store.
    pub async fn open_page_store(&self) -> Result<PageStore> {
        PageStore::open(&self.site_dir, &self.users_dir).await
    }

    /// Loads the screening policy, falling back to the built-in tables.
    pub async fn load_screening_policy(&self) -> Result<ScreeningPolicy> {
        let Some(path) = &self.screening_policy else {
            return Ok(ScreeningPolicy::default());
        };

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::PolicyUnreadable {
                path: path.clone(),
                source,
            })?;

        let policy =
            ScreeningPolicy::from_json(&json).map_err(|source| Error::PolicyInvalid {
                path: path.clone(),
                source,
            })?;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            entries = policy.len(),
            "Screening policy loaded",
        );

        Ok(policy)
    }

    /// Returns the prompt template.
    pub fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate::new(self.protected_classes.iter().map(String::as_str))
    }

    /// Returns the session cookie settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            secure: self.cookie_secure,
            max_age: self.cookie_max_age,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            site_dir: defaults::site_dir(),
            users_dir: defaults::users_dir(),
            cookie_secure: false,
            cookie_max_age: defaults::COOKIE_MAX_AGE,
            protected_classes: defaults::protected_classes(),
            screening_policy: None,
        }
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(site_dir) = &builder.site_dir
            && site_dir.as_os_str().is_empty()
        {
            return Err("site directory cannot be empty".to_string());
        }

        if let Some(users_dir) = &builder.users_dir
            && users_dir.as_os_str().is_empty()
        {
            return Err("users directory cannot be empty".to_string());
        }

        if let Some(max_age) = &builder.cookie_max_age
            && *max_age == 0
        {
            return Err("cookie max age must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = ServiceConfig::builder()
            .with_site_dir("/srv/site")
            .build()
            .unwrap();

        assert_eq!(config.site_dir, PathBuf::from("/srv/site"));
        assert_eq!(config.users_dir, PathBuf::from("./users"));
        assert_eq!(config.cookie_max_age, 2_592_000);
        assert_eq!(config.protected_classes, ["input-bar"]);
        assert!(config.screening_policy.is_none());
    }

    #[test]
    fn builder_rejects_zero_max_age() {
        let result = ServiceConfig::builder().with_cookie_max_age(0u64).build();
        assert!(result.is_err());
    }

    #[test]
    fn default_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn users_dir_must_not_be_the_site_dir() {
        let config = ServiceConfig::builder()
            .with_site_dir("/srv/site")
            .with_users_dir("/srv/site")
            .build()
            .unwrap();

        let error = config.validate().unwrap_err();
        assert!(matches!(error, Error::Config(_)));
        assert!(error.to_string().contains("must differ"));
    }

    #[tokio::test]
    async fn missing_screening_policy_is_unreadable() {
        let config = ServiceConfig::builder()
            .with_screening_policy(PathBuf::from("/nonexistent/policy.json"))
            .build()
            .unwrap();
        let error = config.load_screening_policy().await.unwrap_err();

        assert!(matches!(error, Error::PolicyUnreadable { .. }));
    }

    #[test]
    fn session_config_follows_cookie_options() {
        let config = ServiceConfig::builder()
            .with_cookie_secure(true)
            .with_cookie_max_age(60u64)
            .build()
            .unwrap();

        let session = config.session_config();
        assert!(session.secure);
        assert_eq!(session.max_age, 60);
    }

    #[tokio::test]
    async fn screening_policy_defaults_to_builtin_tables() {
        let policy = ServiceConfig::default().load_screening_policy().await.unwrap();
        assert_eq!(policy, ScreeningPolicy::default());
    }

    #[tokio::test]
    async fn screening_policy_is_loaded_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"script_markup":["<script"],"event_handlers":[],"dangerous_calls":["marquee"]}}"#
        )
        .unwrap();

        let config = ServiceConfig::builder()
            .with_screening_policy(file.path().to_path_buf())
            .build()
            .unwrap();
        let policy = config.load_screening_policy().await.unwrap();

        assert_eq!(policy.len(), 2);
        assert!(!policy.screen("<MARQUEE>").is_safe());
    }

    #[tokio::test]
    async fn invalid_screening_policy_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"unknown":[]}}"#).unwrap();

        let config = ServiceConfig::builder()
            .with_screening_policy(file.path().to_path_buf())
            .build()
            .unwrap();
        let error = config.load_screening_policy().await.unwrap_err();

        assert!(matches!(error, Error::PolicyInvalid { .. }));
    }
}
