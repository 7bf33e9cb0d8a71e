//! The text generation seam.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::Schema;

use crate::Result;

/// A text generation service returning structured output.
///
/// Implementations send `system` as the model instructions and `prompt` as
/// the user message, and ask for output conforming to `schema`. They return
/// the raw response text; parsing and screening are done by the caller.
/// Transport failures should be reported as
/// [`ErrorKind::Communication`](crate::ErrorKind::Communication).
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates a response.
    async fn generate(&self, system: &str, prompt: &str, schema: &Schema) -> Result<String>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn generate(&self, system: &str, prompt: &str, schema: &Schema) -> Result<String> {
        (**self).generate(system, prompt, schema).await
    }
}
