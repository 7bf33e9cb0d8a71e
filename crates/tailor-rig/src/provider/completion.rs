//! Completion provider abstraction.

use std::sync::Arc;

use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::{anthropic, gemini, openai};

use super::credentials::Credentials;
use super::model::{CompletionModel, ProviderKind};
use crate::{Error, Result};

/// Completion provider that wraps the rig completion model implementations.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider {
    service: Arc<CompletionService>,
    temperature: Option<f64>,
}

enum CompletionService {
    Gemini {
        model: gemini::completion::CompletionModel,
        model_name: String,
    },
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    Anthropic {
        model: anthropic::completion::CompletionModel,
        model_name: String,
    },
}

impl CompletionProvider {
    /// Connects to the provider of `model` with `credentials`.
    ///
    /// No request is made; this only builds the client.
    pub fn connect(model: CompletionModel, credentials: Credentials) -> Result<Self> {
        let service = match (credentials, model) {
            (Credentials::Gemini(c), CompletionModel::Gemini(m)) => {
                let client = gemini::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("gemini", e.to_string()))?;
                CompletionService::Gemini {
                    model: client.completion_model(m.as_ref()),
                    model_name: m.as_ref().to_string(),
                }
            }
            (Credentials::OpenAi(c), CompletionModel::OpenAi(m)) => {
                let client = openai::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("openai", e.to_string()))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(m.as_ref()),
                    model_name: m.as_ref().to_string(),
                }
            }
            (Credentials::Anthropic(c), CompletionModel::Anthropic(m)) => {
                let client = anthropic::Client::new(&c.api_key)
                    .map_err(|e| Error::provider("anthropic", e.to_string()))?;
                CompletionService::Anthropic {
                    model: client.completion_model(m.as_ref()),
                    model_name: m.as_ref().to_string(),
                }
            }
            (credentials, model) => {
                return Err(Error::config(format!(
                    "mismatched credentials ({}) and model provider ({})",
                    credentials.provider(),
                    model.provider(),
                )));
            }
        };

        Ok(Self {
            service: Arc::new(service),
            temperature: None,
        })
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.service.as_ref() {
            CompletionService::Gemini { model_name, .. } => model_name,
            CompletionService::OpenAi { model_name, .. } => model_name,
            CompletionService::Anthropic { model_name, .. } => model_name,
        }
    }

    /// Returns the provider.
    pub fn provider(&self) -> ProviderKind {
        match self.service.as_ref() {
            CompletionService::Gemini { .. } => ProviderKind::Gemini,
            CompletionService::OpenAi { .. } => ProviderKind::OpenAi,
            CompletionService::Anthropic { .. } => ProviderKind::Anthropic,
        }
    }

    /// Sends `prompt` with `preamble` as the system instructions.
    pub async fn complete(&self, preamble: &str, prompt: &str) -> Result<String> {
        let provider = self.provider();
        let map_err = |e: CompletionError| Error::provider(provider, e.to_string());
        let preamble = preamble.to_owned();

        match self.service.as_ref() {
            CompletionService::Gemini { model, .. } => model
                .completion_request(prompt)
                .preamble(preamble)
                .temperature_opt(self.temperature)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::OpenAi { model, .. } => model
                .completion_request(prompt)
                .preamble(preamble)
                .temperature_opt(self.temperature)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
            CompletionService::Anthropic { model, .. } => model
                .completion_request(prompt)
                .preamble(preamble)
                .temperature_opt(self.temperature)
                .send()
                .await
                .map(|r| extract_text_content(&r.choice))
                .map_err(map_err),
        }
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.provider())
            .field("model", &self.model_name())
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GeminiCompletionModel;

    #[test]
    fn mismatched_credentials_are_rejected() {
        let model = CompletionModel::Gemini(GeminiCompletionModel::Gemini25Flash);
        let credentials = Credentials::new(ProviderKind::OpenAi, "key");

        let error = CompletionProvider::connect(model, credentials).unwrap_err();
        assert!(matches!(error, Error::Config(_)));
        assert!(error.to_string().contains("openai"));
    }
}
