//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::Error as ServiceError;

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "tailor_server::handler::service";

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        if error.is_storage() {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                source = ?std::error::Error::source(&error),
                "Page storage failed"
            );
        } else {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                "Service misconfigured"
            );
        }

        // Paths and user ids stay in the logs.
        ErrorKind::InternalServerError.into_error()
    }
}
