//! Configuration for the completion provider.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::provider::{CompletionModel, CompletionProvider, Credentials, ProviderKind};
use crate::{Error, Result};

/// Configuration for the AI collaborator.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RigConfig {
    /// Completion provider.
    #[cfg_attr(
        feature = "config",
        arg(long = "ai-provider", env = "AI_PROVIDER", default_value = "gemini")
    )]
    pub provider: ProviderKind,

    /// Model identifier (defaults to the provider's default model).
    #[cfg_attr(feature = "config", arg(long = "ai-model", env = "AI_MODEL"))]
    pub model: Option<String>,

    /// Google Gemini API key.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "GEMINI_API_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// OpenAI API key.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_API_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Anthropic API key.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,

    /// Sampling temperature (provider default when unset).
    #[cfg_attr(feature = "config", arg(long = "ai-temperature", env = "AI_TEMPERATURE"))]
    pub temperature: Option<f64>,
}

impl RigConfig {
    /// Creates a configuration for `provider` with its API key.
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        let mut config = Self {
            provider,
            ..Self::default()
        };
        let api_key = Some(api_key.into());
        match provider {
            ProviderKind::Gemini => config.gemini_api_key = api_key,
            ProviderKind::OpenAi => config.openai_api_key = api_key,
            ProviderKind::Anthropic => config.anthropic_api_key = api_key,
        }
        config
    }

    /// Returns the API key of the selected provider.
    fn api_key(&self) -> Option<&str> {
        match self.provider {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
        }
        .map(str::trim)
        .filter(|key| !key.is_empty())
    }

    /// Returns the selected model.
    pub fn completion_model(&self) -> Result<CompletionModel> {
        match self.model.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => CompletionModel::parse(self.provider, name),
            _ => Ok(CompletionModel::default_for(self.provider)),
        }
    }

    /// Returns the credentials of the selected provider.
    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = self.api_key().ok_or_else(|| {
            Error::config(format!(
                "{} is required for the {} provider",
                self.provider.api_key_env(),
                self.provider
            ))
        })?;
        Ok(Credentials::new(self.provider, api_key))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;
        self.completion_model()?;

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(Error::config(format!(
                "temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }

        Ok(())
    }

    /// Builds the completion provider.
    pub fn connect(&self) -> Result<CompletionProvider> {
        self.validate()?;
        let provider = CompletionProvider::connect(self.completion_model()?, self.credentials()?)?;
        Ok(provider.with_temperature(self.temperature))
    }
}

impl fmt::Debug for RigConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_validation() {
        let error = RigConfig::default().validate().unwrap_err();
        assert!(error.to_string().contains("GEMINI_API_KEY"));

        let config = RigConfig::new(ProviderKind::OpenAi, "   ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn key_of_another_provider_is_ignored() {
        let mut config = RigConfig::new(ProviderKind::Gemini, "key");
        config.provider = ProviderKind::Anthropic;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_model_follows_provider() {
        let config = RigConfig::new(ProviderKind::Anthropic, "key");
        assert_eq!(
            config.completion_model().unwrap().as_str(),
            "claude-sonnet-4-20250514"
        );

        let config = RigConfig {
            model: Some("gemini-2.5-pro".into()),
            ..RigConfig::new(ProviderKind::Gemini, "key")
        };
        assert_eq!(config.completion_model().unwrap().as_str(), "gemini-2.5-pro");
    }

    #[test]
    fn temperature_is_bounded() {
        let config = RigConfig {
            temperature: Some(3.5),
            ..RigConfig::new(ProviderKind::Gemini, "key")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_hides_keys() {
        let config = RigConfig::new(ProviderKind::Gemini, "secret-key");
        assert!(!format!("{config:?}").contains("secret-key"));
    }
}
