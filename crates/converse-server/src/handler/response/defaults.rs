//! Default model response types.

use converse_postgres::model::Tenant;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A tenant's default models.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Defaults {
    pub embedding_model: String,
    pub chat_model: String,
}

impl From<Tenant> for Defaults {
    fn from(tenant: Tenant) -> Self {
        Self {
            embedding_model: tenant.embd_id,
            chat_model: tenant.llm_id,
        }
    }
}
