//! HTTP error with builder-style message, resource and context.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// The error type for HTTP handlers.
///
/// Renders as the failure envelope. Only the kind and the message reach the
/// client; resource and context are for logs.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    context: Option<Cow<'a, str>>,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            message: None,
            resource: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Attaches internal context. Never shown to the client.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Sets the client-facing message, replacing the kind's default.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Sets the resource that caused the error.
    #[inline]
    pub fn with_resource(self, resource: impl Into<Cow<'a, str>>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Converts this error into a static version by cloning all borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            context: self.context.map(|c| Cow::Owned(c.into_owned())),
            message: self.message.map(|m| Cow::Owned(m.into_owned())),
            resource: self.resource.map(|r| Cow::Owned(r.into_owned())),
        }
    }

    /// Builds the envelope this error renders as.
    pub fn response(&self) -> ErrorResponse<'_> {
        let mut response = self.kind.response();
        if let Some(message) = self.message.as_deref() {
            response = response.with_message(message);
        }
        if let Some(resource) = self.resource.as_deref() {
            response = response.with_resource(resource);
        }
        if let Some(context) = self.context.as_deref() {
            response = response.with_context(context);
        }
        response
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("name", &response.name)
            .field("code", &response.code)
            .field("status", &response.status);

        if let Some(ref message) = self.message {
            debug_struct.field("message", message);
        }
        if let Some(ref resource) = self.resource {
            debug_struct.field("resource", resource);
        }
        if let Some(ref context) = self.context {
            debug_struct.field("context", context);
        }

        debug_struct.finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.response();
        write!(f, "{} ({}): {}", response.name, response.code, response.message)?;

        if let Some(ref context) = self.context {
            write!(f, " - {context}")?;
        }
        if let Some(ref resource) = self.resource {
            write!(f, " [resource: {resource}]")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let response = self.response();
        if response.status.is_server_error() {
            tracing::error!(
                target: super::TRACING_TARGET,
                name = %response.name,
                code = response.code,
                resource = response.resource.as_deref(),
                context = response.context.as_deref(),
                message = %response.message,
                "Request failed"
            );
        } else {
            tracing::debug!(
                target: super::TRACING_TARGET,
                name = %response.name,
                code = response.code,
                resource = response.resource.as_deref(),
                context = response.context.as_deref(),
                message = %response.message,
                "Request rejected"
            );
        }

        response.into_response()
    }
}

impl aide::OperationOutput for Error<'static> {
    type Inner = ErrorResponse<'static>;
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every failure class an HTTP handler can report.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400, code 101: a path parameter is missing.
    MissingPathParam,
    /// 400, code 101: malformed input or a failed consistency check.
    BadRequest,
    /// 401, code 109: no `Authorization` header.
    MissingAuthToken,
    /// 401, code 109: the header is not a bearer token.
    MalformedAuthToken,
    /// 401, code 109: the token does not resolve to a tenant.
    Unauthorized,
    /// 403, code 109: the resource belongs to another tenant.
    Forbidden,
    /// 404, code 102.
    NotFound,
    /// 409, code 101: a uniqueness constraint rejected the write.
    Conflict,

    // 5xx Server Errors
    /// 500, code 500: persistence or engine failure.
    #[default]
    InternalServerError,
    /// 500, code 100: panics, timeouts and anything uncaught.
    Unhandled,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the envelope code for this kind.
    #[inline]
    pub fn code(self) -> u16 {
        self.response().code
    }

    /// Returns the default envelope for this kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::MissingPathParam => ErrorResponse::MISSING_PATH_PARAM,
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::Unhandled => ErrorResponse::UNHANDLED,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response().name.as_ref())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_server_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.kind().code(), 500);
    }

    #[test]
    fn kinds_map_to_status_and_code() {
        let expected = [
            (ErrorKind::BadRequest, StatusCode::BAD_REQUEST, 101),
            (ErrorKind::MissingPathParam, StatusCode::BAD_REQUEST, 101),
            (ErrorKind::MissingAuthToken, StatusCode::UNAUTHORIZED, 109),
            (ErrorKind::MalformedAuthToken, StatusCode::UNAUTHORIZED, 109),
            (ErrorKind::Unauthorized, StatusCode::UNAUTHORIZED, 109),
            (ErrorKind::Forbidden, StatusCode::FORBIDDEN, 109),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND, 102),
            (ErrorKind::Conflict, StatusCode::CONFLICT, 101),
            (ErrorKind::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR, 500),
            (ErrorKind::Unhandled, StatusCode::INTERNAL_SERVER_ERROR, 100),
        ];

        for (kind, status, code) in expected {
            assert_eq!(kind.status_code(), status, "{kind}");
            assert_eq!(kind.code(), code, "{kind}");
        }
    }

    #[test]
    fn builder_keeps_every_part() {
        let error = ErrorKind::Forbidden
            .with_message("You do not own the chat")
            .with_resource("chat")
            .with_context("tenant mismatch");

        assert_eq!(error.message(), Some("You do not own the chat"));
        assert_eq!(error.resource(), Some("chat"));
        assert_eq!(error.context(), Some("tenant mismatch"));

        let response = error.response();
        assert_eq!(response.message, "You do not own the chat");
        assert_eq!(response.code, 109);
    }

    #[test]
    fn display_uses_custom_message() {
        let error = ErrorKind::BadRequest.with_message("`name` is required.");
        assert_eq!(error.to_string(), "bad_request (101): `name` is required.");
    }

    #[test]
    fn into_static_owns_borrowed_parts() {
        let message = String::from("Duplicate ids in the list");
        let error = ErrorKind::BadRequest.with_message(message.as_str()).into_static();
        drop(message);
        assert_eq!(error.message(), Some("Duplicate ids in the list"));
    }

    #[test]
    fn into_response_carries_status() {
        let response = ErrorKind::NotFound.into_error().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
