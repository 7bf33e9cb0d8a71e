//! The personalization pipeline.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::apply::{Patched, apply};
use crate::diagnostics::{DiagnosticEvent, Diagnostics, Stage, TracingDiagnostics};
use crate::document::Document;
use crate::edit::{EditBatch, LINE_BREAK_PLACEHOLDER};
use crate::generator::Generator;
use crate::prompt::PromptTemplate;
use crate::screen::{Screening, ScreeningPolicy};
use crate::{Error, Result};

/// Tracing target for pipeline runs.
pub const TRACING_TARGET: &str = "tailor_engine::personalize";

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// At least one edit was applied.
    Applied(Patched),
    /// The model declined the request.
    Declined { reason: Option<String> },
}

impl Outcome {
    /// Returns the patched document, if any.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Applied(patched) => Some(&patched.document),
            Self::Declined { .. } => None,
        }
    }
}

/// Caller-facing result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizeResponse {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Outcome> for PersonalizeResponse {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Applied(patched) => Self {
                accepted: true,
                document: Some(patched.document.to_text()),
                error: None,
            },
            Outcome::Declined { reason } => Self {
                accepted: false,
                document: None,
                error: reason.clone(),
            },
        }
    }
}

impl From<&Error> for PersonalizeResponse {
    fn from(error: &Error) -> Self {
        Self {
            accepted: false,
            document: None,
            error: Some(error.message().to_owned()),
        }
    }
}

impl From<&Result<Outcome>> for PersonalizeResponse {
    fn from(result: &Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(error) => error.into(),
        }
    }
}

/// Runs requests through indexing, generation, screening and application.
///
/// Cheap to clone; all state is shared and read-only.
#[derive(Clone)]
pub struct Personalizer {
    generator: Arc<dyn Generator>,
    policy: Arc<ScreeningPolicy>,
    template: Arc<PromptTemplate>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Personalizer {
    /// Creates a pipeline with the default policy, template and diagnostics.
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            policy: Arc::new(ScreeningPolicy::default()),
            template: Arc::new(PromptTemplate::default()),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Replaces the screening policy.
    pub fn with_policy(mut self, policy: ScreeningPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replaces the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = Arc::new(template);
        self
    }

    /// Replaces the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the screening policy.
    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    /// Applies the natural-language `request` to `document`.
    pub async fn personalize(&self, request: &str, document: &Document) -> Result<Outcome> {
        let result = self.run(request, document).await;

        match &result {
            Ok(Outcome::Applied(patched)) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    applied = patched.report.applied,
                    skipped = patched.report.skipped.len(),
                    "Personalization applied",
                );
                self.enter(Stage::Done);
            }
            Ok(Outcome::Declined { .. }) => self.enter(Stage::Done),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    kind = error.kind_str(),
                    error = %error,
                    "Personalization failed",
                );
                self.enter(Stage::Failed);
            }
        }

        result
    }

    fn screen(&self, text: &str) -> Result<()> {
        let screening = self.policy.screen(text);
        if let Screening::Unsafe { category, fragment } = &screening {
            tracing::warn!(
                target: TRACING_TARGET,
                category = %category,
                fragment = %fragment,
                "Response rejected by screening",
            );
            let reason = screening.reason().unwrap_or_default();
            return Err(Error::content().with_message(reason));
        }
        Ok(())
    }

    async fn run(&self, request: &str, document: &Document) -> Result<Outcome> {
        self.enter(Stage::ValidatingInput);
        if request.trim().is_empty() {
            return Err(Error::invalid_input().with_message("request text is empty"));
        }
        if document.is_blank() {
            return Err(Error::invalid_input().with_message("document is empty"));
        }
        if document.contains_char(LINE_BREAK_PLACEHOLDER) {
            return Err(Error::invalid_input()
                .with_message("document contains the reserved character U+E000"));
        }

        self.enter(Stage::Indexing);
        let indexed = document.index();
        let system = self.template.system_instructions();
        let prompt = self.template.user_prompt(&indexed, request);

        self.enter(Stage::AwaitingResponse);
        let raw = self
            .generator
            .generate(&system, &prompt, &EditBatch::schema())
            .await?;
        if raw.trim().is_empty() {
            return Err(Error::communication().with_message("empty response from generation service"));
        }

        self.enter(Stage::Screening);
        self.screen(&raw)?;

        self.enter(Stage::Decoding);
        let batch = EditBatch::from_response(&raw)?;
        // JSON escapes hide markup from the raw screen; check decoded text too.
        for edit in &batch.edits {
            for text in [&edit.search_text, &edit.write_text].into_iter().flatten() {
                self.screen(text)?;
            }
        }
        if !batch.accepted {
            self.diagnostics.record(DiagnosticEvent::Declined {
                reason: batch.error.clone(),
            });
            return Ok(Outcome::Declined {
                reason: batch.error,
            });
        }
        if batch.edits.is_empty() {
            return Err(Error::content().with_message("no concrete changes provided"));
        }

        self.enter(Stage::Applying);
        let patched = apply(document, &batch.edits, self.diagnostics.as_ref())?;
        Ok(Outcome::Applied(patched))
    }

    fn enter(&self, stage: Stage) {
        self.diagnostics.record(DiagnosticEvent::StageEntered(stage));
    }
}

impl fmt::Debug for Personalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Personalizer")
            .field("policy_entries", &self.policy.len())
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
