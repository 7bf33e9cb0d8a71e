//! [`Generator`] implementation for rig completion providers.

use std::time::Instant;

use async_trait::async_trait;
use schemars::Schema;
use tailor_engine::{Generator, strip_code_fence};

use crate::TRACING_TARGET;
use crate::provider::CompletionProvider;

const RESPONSE_FORMAT: &str = "\
RESPONSE FORMAT
Answer with a single JSON object that conforms to the following JSON Schema. \
Output only the JSON, no explanation and no markdown formatting.";

/// Appends the response schema to the system instructions.
fn render_preamble(system: &str, schema: &Schema) -> tailor_engine::Result<String> {
    let schema = serde_json::to_string_pretty(schema)?;
    Ok(format!("{system}\n\n{RESPONSE_FORMAT}\n\n{schema}"))
}

#[async_trait]
impl Generator for CompletionProvider {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: &Schema,
    ) -> tailor_engine::Result<String> {
        let preamble = render_preamble(system, schema)?;
        let started = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            provider = %self.provider(),
            model = self.model_name(),
            prompt_len = prompt.len(),
            "Sending completion request",
        );

        let text = self.complete(&preamble, prompt).await.inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                provider = %self.provider(),
                model = self.model_name(),
                error = %error,
                "Completion request failed",
            );
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            provider = %self.provider(),
            model = self.model_name(),
            response_len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received",
        );

        Ok(strip_code_fence(&text).to_owned())
    }
}
