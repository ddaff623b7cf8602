use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::types::ModelType;
use crate::{PgConnection, PgError, PgResult, schema};

/// Registered model lookups.
pub trait TenantModelRepository {
    /// Returns `true` if the tenant registered `model_id` with the given type.
    ///
    /// `model_id` is either a bare model name or `name@factory`.
    fn tenant_model_exists(
        &mut self,
        tenant_id: Uuid,
        model_id: &str,
        model_type: ModelType,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl TenantModelRepository for PgConnection {
    async fn tenant_model_exists(
        &mut self,
        tenant_id: Uuid,
        model_id: &str,
        model_type: ModelType,
    ) -> PgResult<bool> {
        use schema::tenant_models::{self, dsl};

        let mut query = tenant_models::table
            .select(dsl::id)
            .filter(dsl::tenant_id.eq(tenant_id))
            .filter(dsl::model_type.eq(model_type))
            .into_boxed();

        query = match model_id.rsplit_once('@') {
            Some((name, factory)) => query
                .filter(dsl::llm_name.eq(name.to_owned()))
                .filter(dsl::llm_factory.eq(factory.to_owned())),
            None => query.filter(dsl::llm_name.eq(model_id.to_owned())),
        };

        let found: Option<Uuid> = query
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(found.is_some())
    }
}
