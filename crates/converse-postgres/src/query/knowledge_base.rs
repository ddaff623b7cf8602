use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::KnowledgeBase;
use crate::types::RecordStatus;
use crate::{PgConnection, PgError, PgResult, schema};

/// Knowledge base lookups used when linking datasets to dialogs.
pub trait KnowledgeBaseRepository {
    /// Finds a valid knowledge base owned by `tenant_id`.
    fn find_accessible_knowledge_base(
        &mut self,
        tenant_id: Uuid,
        kb_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<KnowledgeBase>>> + Send;
}

impl KnowledgeBaseRepository for PgConnection {
    async fn find_accessible_knowledge_base(
        &mut self,
        tenant_id: Uuid,
        kb_id: Uuid,
    ) -> PgResult<Option<KnowledgeBase>> {
        use schema::knowledge_bases::{self, dsl};

        let knowledge_base = knowledge_bases::table
            .filter(dsl::id.eq(kb_id))
            .filter(dsl::tenant_id.eq(tenant_id))
            .filter(dsl::status.eq(RecordStatus::Valid))
            .select(KnowledgeBase::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(knowledge_base)
    }
}
