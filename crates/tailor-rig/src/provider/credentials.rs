//! Provider credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::model::ProviderKind;

/// API key credentials for AI providers.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiKeyCredentials {
    /// API key.
    pub api_key: String,
}

impl ApiKeyCredentials {
    /// Creates credentials from an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Credentials for one of the supported providers.
#[derive(Debug, Clone, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "provider", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Credentials {
    /// Google Gemini credentials.
    Gemini(ApiKeyCredentials),
    /// OpenAI credentials.
    OpenAi(ApiKeyCredentials),
    /// Anthropic credentials.
    Anthropic(ApiKeyCredentials),
}

impl Credentials {
    /// Creates credentials for `provider`.
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        let credentials = ApiKeyCredentials::new(api_key);
        match provider {
            ProviderKind::Gemini => Self::Gemini(credentials),
            ProviderKind::OpenAi => Self::OpenAi(credentials),
            ProviderKind::Anthropic => Self::Anthropic(credentials),
        }
    }

    /// Returns the provider these credentials belong to.
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::Anthropic(_) => ProviderKind::Anthropic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_key() {
        let credentials = Credentials::new(ProviderKind::Gemini, "secret-key");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret-key"));
        assert_eq!(credentials.provider(), ProviderKind::Gemini);
    }
}
