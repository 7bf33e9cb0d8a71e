//! Handler errors.
//!
//! An [`ErrorKind`] fixes the status code, the `name` field and the fallback
//! message. An [`Error`] adds what the visitor should read, and optionally
//! which asset or input the failure is about. Every route renders it as an
//! [`ErrorResponse`] body except `POST /personalize`, which folds it into a
//! [`PersonalizeResponse`].

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::{ErrorResponse, PersonalizeResponse};

/// A specialized [`Result`] type for handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure category of a request.
#[must_use = "error kinds do nothing unless turned into errors"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The body or the message is unusable.
    BadRequest,
    /// A reset arrived without a session cookie.
    MissingSession,
    /// The asset path is outside the site or of a type that is not served.
    Forbidden,
    /// No such route or asset.
    NotFound,
    /// The body exceeds the configured limit.
    PayloadTooLarge,
    /// The model's changes were unsafe, malformed or did not apply.
    UnprocessableEntity,
    /// Storage failure, panic or timeout.
    InternalServerError,
    /// The completion provider failed.
    BadGateway,
}

impl ErrorKind {
    /// Returns the response template of this kind.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingSession => ErrorResponse::MISSING_SESSION,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::UnprocessableEntity => ErrorResponse::UNPROCESSABLE_ENTITY,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::BadGateway => ErrorResponse::BAD_GATEWAY,
        }
    }

    /// Returns the status code of this kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Creates an error carrying only this kind.
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an error with a visitor-facing message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

/// A handler error.
#[must_use = "errors do nothing unless returned"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
    resource: Option<&'static str>,
    context: Option<String>,
}

impl Error {
    /// Creates an error of `kind` with the kind's fallback message.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
            context: None,
        }
    }

    /// An asset request outside the site or of a type that is not served.
    pub fn asset_forbidden() -> Self {
        ErrorKind::Forbidden
            .with_message("Only HTML, CSS and JavaScript files are served")
            .with_resource("asset")
    }

    /// A served asset type that does not exist under the site directory.
    pub fn asset_not_found(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound)
            .with_resource("asset")
            .with_context(path)
    }

    /// Replaces the visitor-facing message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the kind of thing the error is about, e.g. `asset`.
    #[inline]
    pub fn with_resource(mut self, resource: &'static str) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Adds a detail such as the offending path or a parser message.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the custom message, if any.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the resource, if any.
    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource
    }

    /// Returns the context, if any.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the text a visitor reads: the custom message, or the kind's
    /// fallback message.
    pub fn describe(&self) -> Cow<'static, str> {
        match &self.message {
            Some(message) => message.clone(),
            None => self.kind.response().message,
        }
    }

    /// Folds the error into the `{accepted: false, error}` reply of the
    /// personalization endpoint.
    pub fn to_personalize_response(&self) -> PersonalizeResponse {
        PersonalizeResponse {
            accepted: false,
            document: None,
            error: Some(self.describe().into_owned()),
        }
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.status_code().as_u16(), self.kind, self.describe())?;
        match (self.resource, &self.context) {
            (Some(resource), Some(context)) => write!(f, " ({resource} {context})"),
            (Some(resource), None) => write!(f, " ({resource})"),
            (None, Some(context)) => write!(f, " ({context})"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let mut body = self.kind.response();
        if let Some(message) = self.message {
            body.message = message;
        }
        body.resource = self.resource.map(Cow::Borrowed);
        body.context = self.context.map(Cow::Owned);

        body.into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (ErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (ErrorKind::MissingSession, StatusCode::BAD_REQUEST),
            (ErrorKind::Forbidden, StatusCode::FORBIDDEN),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (ErrorKind::UnprocessableEntity, StatusCode::UNPROCESSABLE_ENTITY),
            (ErrorKind::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::BadGateway, StatusCode::BAD_GATEWAY),
        ];

        for (kind, status) in cases {
            assert_eq!(kind.status_code(), status);
            assert_eq!(kind.into_response().status(), status);
        }
    }

    #[test]
    fn describe_prefers_the_custom_message() {
        let error = ErrorKind::MissingSession.into_error();
        assert_eq!(error.describe(), "No session was found for this request");

        let error = ErrorKind::BadRequest.with_message("The message cannot be empty");
        assert_eq!(error.describe(), "The message cannot be empty");
    }

    #[test]
    fn personalize_reply_carries_the_description() {
        let reply = Error::new(ErrorKind::BadGateway).to_personalize_response();

        assert!(!reply.accepted);
        assert!(reply.document.is_none());
        assert_eq!(
            reply.error.as_deref(),
            Some("The generation service could not be reached. Please try again later")
        );
    }

    #[test]
    fn display_names_the_asset() {
        let error = Error::asset_not_found("css/site.css");
        assert_eq!(
            error.to_string(),
            "404 not_found: The requested resource was not found (asset css/site.css)"
        );
    }

    #[tokio::test]
    async fn body_replaces_the_fallback_message() -> anyhow::Result<()> {
        let response = Error::asset_forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["name"], "forbidden");
        assert_eq!(json["message"], "Only HTML, CSS and JavaScript files are served");
        assert_eq!(json["resource"], "asset");
        assert!(json.get("context").is_none());

        Ok(())
    }
}
