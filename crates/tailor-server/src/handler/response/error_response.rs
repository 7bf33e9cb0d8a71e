use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// HTTP error response body.
///
/// The status code is carried alongside but never serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const FORBIDDEN: Self = Self::new(
        "forbidden",
        "You don't have permission to access this resource",
        StatusCode::FORBIDDEN,
    );
    pub const MISSING_SESSION: Self = Self::new(
        "missing_session",
        "No session was found for this request",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "The request body exceeds the allowed size",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const UNPROCESSABLE_ENTITY: Self = Self::new(
        "unprocessable_entity",
        "The requested changes could not be applied",
        StatusCode::UNPROCESSABLE_ENTITY,
    );
    // 5xx Server Errors
    pub const BAD_GATEWAY: Self = Self::new(
        "bad_gateway",
        "The generation service could not be reached. Please try again later",
        StatusCode::BAD_GATEWAY,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            status,
        }
    }

    /// Sets the resource, joining it to an existing one with `/`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, new_resource)),
            None => new_resource,
        });
        self
    }

    /// Appends `message` to the existing message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        self.message = Cow::Owned(format!("{}. {}", self.message, new_message));
        self
    }

    /// Attaches context, joining it to existing context with `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_message() {
        let response = ErrorResponse::NOT_FOUND.with_message("Unknown asset");

        assert_eq!(
            &response.message,
            "The requested resource was not found. Unknown asset"
        );
    }

    #[test]
    fn merging_resource_and_context() {
        let response = ErrorResponse::FORBIDDEN
            .with_resource("asset")
            .with_resource("css")
            .with_context("extension not served")
            .with_context("secret.txt");

        assert_eq!(response.resource.as_deref(), Some("asset/css"));
        assert_eq!(
            response.context.as_deref(),
            Some("extension not served; secret.txt")
        );
    }

    #[test]
    fn serialization_skips_status() {
        let response = ErrorResponse::BAD_GATEWAY.with_context("timeout");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "bad_gateway");
        assert_eq!(json["context"], "timeout");
        assert!(json.get("status").is_none());
        assert!(json.get("resource").is_none());
    }
}
