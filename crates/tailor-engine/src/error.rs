//! Error type for the personalization pipeline.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors a personalization run can end with.
///
/// Descriptor-level failures are not errors: they are absorbed by the
/// applicator and reported through [`ApplyReport`](crate::ApplyReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Empty request text or empty document. No AI call was made.
    InvalidInput,
    /// The AI collaborator was unreachable, timed out or returned nothing.
    Communication,
    /// The AI response could not be trusted or used: malformed data, unsafe
    /// content, no edits, or no edit could be applied.
    Content,
}

/// A structured error for personalization runs.
#[derive(Debug, Error)]
#[error("{}{}", .kind.as_ref(), .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new communication error.
    pub fn communication() -> Self {
        Self::new(ErrorKind::Communication)
    }

    /// Creates a new content error.
    pub fn content() -> Self {
        Self::new(ErrorKind::Content)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the message, falling back to the kind name.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_else(|| self.kind.as_ref())
    }

    /// Returns true if the caller may retry the same request.
    ///
    /// Only communication failures are transient; content errors would be
    /// reproduced by the same AI output.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Communication)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::content()
            .with_message(format!("invalid AI response: {error}"))
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::content().with_message("no concrete changes provided");
        assert_eq!(error.to_string(), "content: no concrete changes provided");

        let error = Error::invalid_input();
        assert_eq!(error.to_string(), "invalid_input");
    }

    #[test]
    fn only_communication_is_retryable() {
        assert!(Error::communication().is_retryable());
        assert!(!Error::content().is_retryable());
        assert!(!Error::invalid_input().is_retryable());
    }

    #[test]
    fn json_errors_become_content_errors() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(json_error);
        assert_eq!(error.kind(), ErrorKind::Content);
        assert!(error.message().starts_with("invalid AI response"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
