//! Error types for tailor-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or calling a provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (client construction or API call failed).
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

impl From<Error> for tailor_engine::Error {
    fn from(error: Error) -> Self {
        let message = error.to_string();
        let base = match &error {
            Error::Provider { .. } => tailor_engine::Error::communication(),
            Error::Config(_) => tailor_engine::Error::invalid_input(),
        };
        base.with_message(message).with_source(error)
    }
}
