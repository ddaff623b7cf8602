use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::{tenant_api_tokens, tenants};

/// A tenant and its default models.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// Default chat model for dialogs created without one.
    pub llm_id: String,
    /// Default embedding model.
    pub embd_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Changes to a tenant's default models.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateTenant {
    pub llm_id: Option<String>,
    pub embd_id: Option<String>,
}

/// Bearer token that authenticates API calls on behalf of a tenant.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = tenant_api_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TenantApiToken {
    pub token: String,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
}
