use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// Envelope code for malformed input and failed consistency checks.
pub const CODE_ARGUMENT_ERROR: u16 = 101;
/// Envelope code for lookups of records that do not exist.
pub const CODE_DATA_ERROR: u16 = 102;
/// Envelope code for authentication failures and cross-tenant access.
pub const CODE_AUTHENTICATION_ERROR: u16 = 109;
/// Envelope code for persistence and other server-side failures.
pub const CODE_SERVER_ERROR: u16 = 500;
/// Envelope code for failures nothing else caught: panics and timeouts.
pub const CODE_EXCEPTION_ERROR: u16 = 100;

/// Failure half of the uniform response envelope.
///
/// Serializes to exactly `{code, message, data: null}`. The error name,
/// resource and context are kept for logging and never reach the client.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
    /// Non-zero envelope code.
    pub code: u16,
    /// Message safe for client display.
    pub message: Cow<'a, str>,
    /// Always `null` for failures.
    pub data: Option<serde_json::Value>,

    /// The error name/type identifier.
    #[serde(skip)]
    pub name: Cow<'a, str>,
    /// The resource that the error relates to.
    #[serde(skip)]
    pub resource: Option<Cow<'a, str>>,
    /// Internal context for debugging.
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code.
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        CODE_ARGUMENT_ERROR,
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const CONFLICT: Self = Self::new(
        "conflict",
        CODE_ARGUMENT_ERROR,
        "Resource state conflict.",
        StatusCode::CONFLICT,
    );
    pub const FORBIDDEN: Self = Self::new(
        "forbidden",
        CODE_AUTHENTICATION_ERROR,
        "Access denied.",
        StatusCode::FORBIDDEN,
    );
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        CODE_AUTHENTICATION_ERROR,
        "Authorization is not valid!",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        CODE_AUTHENTICATION_ERROR,
        "Authorization is not valid!",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        CODE_ARGUMENT_ERROR,
        "Missing required path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        CODE_DATA_ERROR,
        "Resource not found.",
        StatusCode::NOT_FOUND,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        CODE_AUTHENTICATION_ERROR,
        "API key is invalid!",
        StatusCode::UNAUTHORIZED,
    );

    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        CODE_SERVER_ERROR,
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const UNHANDLED: Self = Self::new(
        "unhandled",
        CODE_EXCEPTION_ERROR,
        "Unhandled server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, code: u16, message: &'a str, status: StatusCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
            data: None,
            name: Cow::Borrowed(name),
            resource: None,
            context: None,
            status,
        }
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the resource, joining with an existing one by `/`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{existing}/{new_resource}")),
            None => new_resource,
        });
        self
    }

    /// Attaches context, joining with existing context by `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{existing}; {new_context}")),
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
    fn custom_message_replaces_default() {
        let response = ErrorResponse::BAD_REQUEST.with_message("`name` is required.");
        assert_eq!(response.message, "`name` is required.");
        assert_eq!(response.code, CODE_ARGUMENT_ERROR);
    }

    #[test]
    fn resource_and_context_are_merged() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("tenant")
            .with_resource("chat")
            .with_context("lookup failed")
            .with_context("retried once");

        assert_eq!(response.resource.as_deref(), Some("tenant/chat"));
        assert_eq!(
            response.context.as_deref(),
            Some("lookup failed; retried once")
        );
    }

    #[test]
    fn serializes_to_bare_envelope() {
        let response = ErrorResponse::FORBIDDEN
            .with_message("You do not own the chat")
            .with_resource("chat")
            .with_context("tenant mismatch");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": 109,
                "message": "You do not own the chat",
                "data": null,
            })
        );
    }

    #[test]
    fn unhandled_and_server_errors_share_status_but_not_code() {
        assert_eq!(ErrorResponse::UNHANDLED.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorResponse::UNHANDLED.code, CODE_EXCEPTION_ERROR);
        assert_eq!(ErrorResponse::default().code, CODE_SERVER_ERROR);
    }
}
