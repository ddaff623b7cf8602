//! JSON extractor that runs `validator` rules after deserialization.

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::Json;
use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "converse_server::extract::validate";

/// JSON body that passed [`Validate::validate`].
///
/// A rule's custom `message` is used as the envelope message unchanged, so
/// request types can carry the exact wording clients expect.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self(data))
    }
}

/// Renders one failed rule.
fn describe(field: &str, error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "length" => format!("`{field}` has an invalid length."),
        "range" => format!("`{field}` is out of range."),
        "required" => format!("`{field}` is required."),
        code => format!("`{field}` failed validation: {code}"),
    }
}

/// Collects messages depth-first so nested structs report their own fields.
fn collect(errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                messages.extend(field_errors.iter().map(|e| describe(field, e)));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, messages),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect(nested, messages);
                }
            }
        }
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect(&errors, &mut messages);
        messages.sort();

        tracing::debug!(
            target: TRACING_TARGET,
            errors = ?messages,
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            [single] => single.clone(),
            multiple => multiple.join(" "),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}
