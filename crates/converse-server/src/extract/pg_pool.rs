use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use converse_postgres::{PgClient, PgConn};
use derive_more::{Deref, DerefMut};

use crate::handler::Error;

/// A pooled database connection checked out for the whole handler.
///
/// Place it after [`AuthState`] so unauthenticated requests are rejected
/// before a connection is taken from the pool.
///
/// [`AuthState`]: crate::extract::AuthState
#[derive(Debug, Deref, DerefMut)]
pub struct PgPool(pub PgConn);

impl<S> FromRequestParts<S> for PgPool
where
    PgClient: FromRef<S>,
    S: Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pg_client = PgClient::from_ref(state);
        let conn = pg_client.get_connection().await?;
        Ok(PgPool(conn))
    }
}

impl aide::OperationInput for PgPool {}
