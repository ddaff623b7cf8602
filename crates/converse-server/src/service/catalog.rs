//! [`DialogCatalog`] backed by a pooled Postgres connection.

use converse_core::dialog::{DialogCatalog, KnowledgeBaseSummary, ModelKind};
use converse_postgres::query::{DialogRepository, KnowledgeBaseRepository, TenantModelRepository};
use converse_postgres::types::ModelType;
use converse_postgres::{PgConn, PgError};
use uuid::Uuid;

use crate::service::{Error, Result};

/// Answers the validator's lookups from the database.
///
/// Borrows the handler's connection so validation and the following write
/// share one pool checkout.
pub struct PgDialogCatalog<'a> {
    conn: &'a mut PgConn,
}

impl<'a> PgDialogCatalog<'a> {
    #[inline]
    pub fn new(conn: &'a mut PgConn) -> Self {
        Self { conn }
    }
}

fn model_type(kind: ModelKind) -> ModelType {
    match kind {
        ModelKind::Chat => ModelType::Chat,
        ModelKind::Embedding => ModelType::Embedding,
        ModelKind::Rerank => ModelType::Rerank,
    }
}

fn lookup_failed(error: PgError) -> Error {
    Error::internal_error()
        .with_message("Catalog lookup failed")
        .with_source(error)
}

impl DialogCatalog for PgDialogCatalog<'_> {
    async fn find_accessible_knowledge_base(
        &mut self,
        tenant_id: Uuid,
        kb_id: Uuid,
    ) -> Result<Option<KnowledgeBaseSummary>> {
        let knowledge_base = self
            .conn
            .find_accessible_knowledge_base(tenant_id, kb_id)
            .await
            .map_err(lookup_failed)?;

        Ok(knowledge_base.map(|kb| KnowledgeBaseSummary {
            id: kb.id,
            embd_id: kb.embd_id,
            chunk_num: kb.chunk_num,
        }))
    }

    async fn model_exists(
        &mut self,
        tenant_id: Uuid,
        model_id: &str,
        kind: ModelKind,
    ) -> Result<bool> {
        self.conn
            .tenant_model_exists(tenant_id, model_id, model_type(kind))
            .await
            .map_err(lookup_failed)
    }

    async fn dialog_name_taken(
        &mut self,
        tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool> {
        self.conn
            .dialog_name_taken(tenant_id, name, excluding)
            .await
            .map_err(lookup_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kinds_map_one_to_one() {
        assert_eq!(model_type(ModelKind::Chat), ModelType::Chat);
        assert_eq!(model_type(ModelKind::Embedding), ModelType::Embedding);
        assert_eq!(model_type(ModelKind::Rerank), ModelType::Rerank);
    }
}
