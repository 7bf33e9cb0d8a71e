//! Type-safe completion model references.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Supported completion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Google Gemini.
    #[default]
    Gemini,
    /// OpenAI.
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    /// Anthropic.
    Anthropic,
}

impl ProviderKind {
    /// Returns the environment variable conventionally holding the API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Reference to a completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "model", rename_all = "snake_case")]
pub enum CompletionModel {
    /// Google Gemini completion models.
    Gemini(GeminiCompletionModel),
    /// OpenAI completion models.
    OpenAi(OpenAiCompletionModel),
    /// Anthropic models.
    Anthropic(AnthropicModel),
}

/// Google Gemini completion models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GeminiCompletionModel {
    /// Gemini 2.5 Flash (fast, the default)
    #[default]
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    /// Gemini 2.5 Flash-Lite (fastest)
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    /// Gemini 2.5 Pro (most capable)
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    /// Gemini 2.0 Flash
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
}

/// OpenAI completion models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OpenAiCompletionModel {
    /// GPT-4.1 (flagship)
    #[strum(serialize = "gpt-4.1")]
    Gpt41,
    /// GPT-4.1 mini (fast, affordable)
    #[default]
    #[strum(serialize = "gpt-4.1-mini")]
    Gpt41Mini,
    /// GPT-4o (multimodal)
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    /// GPT-4o mini
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
}

/// Anthropic models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AnthropicModel {
    /// Claude Opus 4 (most capable)
    #[strum(serialize = "claude-opus-4-20250514")]
    ClaudeOpus4,
    /// Claude Sonnet 4 (balanced)
    #[default]
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    /// Claude Haiku 3.5 (fast)
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    ClaudeHaiku35,
}

impl CompletionModel {
    /// Returns the default model of `provider`.
    pub fn default_for(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Gemini => Self::Gemini(GeminiCompletionModel::default()),
            ProviderKind::OpenAi => Self::OpenAi(OpenAiCompletionModel::default()),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicModel::default()),
        }
    }

    /// Parses a model identifier of `provider`.
    pub fn parse(provider: ProviderKind, name: &str) -> Result<Self> {
        let unknown = |_| Error::config(format!("unknown {provider} model '{name}'"));
        Ok(match provider {
            ProviderKind::Gemini => Self::Gemini(name.parse().map_err(unknown)?),
            ProviderKind::OpenAi => Self::OpenAi(name.parse().map_err(unknown)?),
            ProviderKind::Anthropic => Self::Anthropic(name.parse().map_err(unknown)?),
        })
    }

    /// Returns the provider of this model.
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::Anthropic(_) => ProviderKind::Anthropic,
        }
    }

    /// Returns the model identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini(m) => m.as_ref(),
            Self::OpenAi(m) => m.as_ref(),
            Self::Anthropic(m) => m.as_ref(),
        }
    }
}

impl Default for CompletionModel {
    fn default() -> Self {
        Self::default_for(ProviderKind::default())
    }
}
