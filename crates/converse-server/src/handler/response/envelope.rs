use axum::Json;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Success half of the uniform response envelope: `{code: 0, message: "success", data}`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope<T> {
    /// Always `0`.
    pub code: u16,
    /// Always `"success"`.
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wraps `data` in a success envelope.
    pub fn new(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_owned(),
            data,
        }
    }

    /// Returns the wrapped payload.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> IntoResponse for Envelope<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl<T> aide::OperationOutput for Envelope<T>
where
    T: JsonSchema + Serialize,
{
    type Inner = Self;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<Self>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<Self>::inferred_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_payload_with_success_code() {
        let json = serde_json::to_value(Envelope::new(true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": 0, "message": "success", "data": true})
        );
    }
}
