use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Tenant, TenantApiToken, UpdateTenant};
use crate::{PgConnection, PgError, PgResult, schema};

/// Tenant and API token lookups.
pub trait TenantRepository {
    fn find_tenant_by_id(
        &mut self,
        tenant_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Tenant>>> + Send;

    /// Replaces the tenant's default models. Unset fields stay unchanged.
    fn update_tenant_defaults(
        &mut self,
        tenant_id: Uuid,
        changes: UpdateTenant,
    ) -> impl Future<Output = PgResult<Tenant>> + Send;

    /// Resolves a bearer token and stamps its `last_used_at`.
    fn find_tenant_by_api_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = PgResult<Option<TenantApiToken>>> + Send;
}

impl TenantRepository for PgConnection {
    async fn find_tenant_by_id(&mut self, tenant_id: Uuid) -> PgResult<Option<Tenant>> {
        use schema::tenants::{self, dsl};

        let tenant = tenants::table
            .filter(dsl::id.eq(tenant_id))
            .select(Tenant::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(tenant)
    }

    async fn update_tenant_defaults(
        &mut self,
        tenant_id: Uuid,
        changes: UpdateTenant,
    ) -> PgResult<Tenant> {
        use schema::tenants::{self, dsl};

        let tenant = diesel::update(tenants::table.filter(dsl::id.eq(tenant_id)))
            .set(&changes)
            .returning(Tenant::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(tenant)
    }

    async fn find_tenant_by_api_token(&mut self, token: &str) -> PgResult<Option<TenantApiToken>> {
        use diesel::dsl::now;
        use schema::tenant_api_tokens::{self, dsl};

        let token = diesel::update(tenant_api_tokens::table.filter(dsl::token.eq(token)))
            .set(dsl::last_used_at.eq(now))
            .returning(TenantApiToken::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(token)
    }
}
