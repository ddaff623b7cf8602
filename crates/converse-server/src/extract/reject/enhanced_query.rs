use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::truncate_rejection;
use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "converse_server::extract::query";

/// Enhanced version of [`axum::extract::Query`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<QueryRejection> for Error<'static> {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %rejection,
            "query string rejected"
        );

        let QueryRejection::FailedToDeserializeQueryString(err) = rejection else {
            return ErrorKind::BadRequest.with_message("Invalid query parameters");
        };

        let detail = err.body_text();
        let message = match quoted_field(&detail) {
            Some(field) if detail.contains("missing field") => {
                format!("Missing required query parameter `{field}`")
            }
            Some(field) if detail.contains("duplicate field") => {
                format!("Duplicate query parameter `{field}`")
            }
            _ => "Invalid query parameters".to_owned(),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_context(truncate_rejection(&detail, 3, 200))
    }
}

/// Returns the first backtick-quoted name in a serde error message.
fn quoted_field(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_field_finds_the_name() {
        assert_eq!(quoted_field("missing field `page_size`"), Some("page_size"));
        assert_eq!(quoted_field("invalid digit found in string"), None);
    }
}
