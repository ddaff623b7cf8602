//! Bearer API-token authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use converse_postgres::PgClient;
use converse_postgres::query::TenantRepository;
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};

/// The tenant a request acts on behalf of.
///
/// Resolved from `Authorization: Bearer <token>` against the stored API
/// tokens. Cached in the request extensions, so several extractions in one
/// request hit the database once.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthState {
    tenant_id: Uuid,
}

impl AuthState {
    /// Wraps an already verified tenant id.
    #[inline]
    pub const fn from_verified_tenant(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    #[inline]
    pub const fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    /// Looks the token up and returns the owning tenant.
    pub async fn from_token(token: &str, pg_client: &PgClient) -> Result<Self> {
        let mut conn = pg_client.get_connection().await.map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "Database connection failed during authentication"
            );
            Error::from(error)
        })?;

        let Some(api_token) = conn.find_tenant_by_api_token(token).await? else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                "Authentication failed: unknown API token"
            );
            return Err(ErrorKind::Unauthorized.into_error());
        };

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            tenant_id = %api_token.tenant_id,
            token_name = %api_token.name,
            "API token verified"
        );

        Ok(Self::from_verified_tenant(api_token.tenant_id))
    }
}

/// Extracts the raw bearer token, mapping header rejections to 401s.
async fn bearer_token<S>(parts: &mut Parts, state: &S) -> Result<String>
where
    S: Send + Sync,
{
    type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

    match AuthBearerHeader::from_request_parts(parts, state).await {
        Ok(TypedHeader(Authorization(bearer))) => Ok(bearer.token().to_owned()),
        Err(rejection) => Err(match rejection.reason() {
            TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                .with_context("missing `Authorization` header"),
            _ => ErrorKind::MalformedAuthToken
                .with_context("`Authorization` header is not a bearer token"),
        }),
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    PgClient: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(*auth_state);
        }

        let token = bearer_token(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let auth_state = Self::from_token(&token, &pg_client).await?;

        parts.extensions.insert(auth_state);
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;

    use super::*;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/chats");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_missing_auth_token() {
        let error = bearer_token(&mut parts(None), &()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingAuthToken);
        assert_eq!(error.response().message, "Authorization is not valid!");
    }

    #[tokio::test]
    async fn non_bearer_header_is_malformed() {
        let error = bearer_token(&mut parts(Some("Basic dXNlcjpwYXNz")), &())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        assert_eq!(error.kind().code(), 109);
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        let token = bearer_token(&mut parts(Some("Bearer converse-abc123")), &())
            .await
            .unwrap();
        assert_eq!(token, "converse-abc123");
    }
}
