//! Personalization error to HTTP error conversion.

use tailor_engine::{Error as EngineError, ErrorKind as EngineErrorKind};

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for personalization error conversions.
const TRACING_TARGET: &str = "tailor_server::handler::engine";

impl From<EngineErrorKind> for ErrorKind {
    fn from(kind: EngineErrorKind) -> Self {
        match kind {
            EngineErrorKind::InvalidInput => ErrorKind::BadRequest,
            EngineErrorKind::Content => ErrorKind::UnprocessableEntity,
            EngineErrorKind::Communication => ErrorKind::BadGateway,
        }
    }
}

impl From<&EngineError> for HttpError {
    fn from(error: &EngineError) -> Self {
        match error.kind() {
            EngineErrorKind::InvalidInput => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Invalid personalization input"
                );
            }
            EngineErrorKind::Content => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Generated changes rejected"
                );
            }
            EngineErrorKind::Communication => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Generation service failed"
                );
            }
        }

        ErrorKind::from(error.kind()).with_message(error.message().to_owned())
    }
}
