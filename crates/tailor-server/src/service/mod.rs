//! Application state and dependency injection.

mod config;
mod session;
mod storage;

use std::sync::Arc;

use tailor_engine::{Generator, Personalizer};

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::session::{SessionConfig, USER_ID_COOKIE, UserId};
pub use crate::service::storage::{
    Asset, AssetKind, AssetPath, PAGE_FILE_NAME, PageStore, StoredPage,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub personalizer: Personalizer,

    // Internal services:
    pub page_store: PageStore,
    pub session_config: SessionConfig,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Opens the page store and loads the screening policy.
    pub async fn from_config(
        service_config: &ServiceConfig,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        service_config.validate()?;

        let personalizer = Personalizer::new(generator)
            .with_policy(service_config.load_screening_policy().await?)
            .with_template(service_config.prompt_template());

        let service_state = Self {
            personalizer,
            page_store: service_config.open_page_store().await?,
            session_config: service_config.session_config(),
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(personalizer: Personalizer);

// Internal services:
impl_di!(page_store: PageStore);
impl_di!(session_config: SessionConfig);
