//! Scripted [`Generator`] for testing.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! tailor-engine = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use schemars::Schema;

use crate::edit::EditBatch;
use crate::generator::Generator;
use crate::{Error, Result};

/// A scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Unreachable,
}

/// A prompt received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPrompt {
    pub system: String,
    pub prompt: String,
}

/// Generator returning scripted replies in order.
///
/// The last reply is repeated once the script runs out.
#[derive(Debug)]
pub struct MockGenerator {
    replies: Mutex<VecDeque<Reply>>,
    received: Mutex<Vec<ReceivedPrompt>>,
}

impl MockGenerator {
    fn from_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Always replies with `text`.
    pub fn respond(text: impl Into<String>) -> Self {
        Self::from_replies([Reply::Text(text.into())])
    }

    /// Always replies with the JSON form of `batch`.
    pub fn batch(batch: &EditBatch) -> Self {
        Self::respond(serde_json::to_string(batch).unwrap_or_default())
    }

    /// Always fails as if the service were unreachable.
    pub fn unreachable() -> Self {
        Self::from_replies([Reply::Unreachable])
    }

    /// Replies with each text in turn.
    pub fn sequence<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_replies(texts.into_iter().map(|text| Reply::Text(text.into())))
    }

    /// Returns every prompt received so far.
    pub fn received(&self) -> Vec<ReceivedPrompt> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }

    /// Returns the number of calls made.
    pub fn calls(&self) -> usize {
        self.received().len()
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut replies = self.replies.lock().ok()?;
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, system: &str, prompt: &str, _schema: &Schema) -> Result<String> {
        if let Ok(mut received) = self.received.lock() {
            received.push(ReceivedPrompt {
                system: system.to_owned(),
                prompt: prompt.to_owned(),
            });
        }

        match self.next_reply() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Unreachable) | None => {
                Err(Error::communication().with_message("generation service is unreachable"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_repeats_last_reply() {
        let mock = MockGenerator::sequence(["a", "b"]);
        let schema = EditBatch::schema();

        assert_eq!(mock.generate("s", "p", &schema).await.unwrap(), "a");
        assert_eq!(mock.generate("s", "p", &schema).await.unwrap(), "b");
        assert_eq!(mock.generate("s", "p", &schema).await.unwrap(), "b");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn unreachable_is_retryable() {
        let mock = MockGenerator::unreachable();
        let error = mock
            .generate("s", "p", &EditBatch::schema())
            .await
            .unwrap_err();
        assert!(error.is_retryable());
    }
}
