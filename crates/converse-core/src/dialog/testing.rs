//! In-memory [`DialogCatalog`] for unit tests.

use std::collections::HashMap;

use uuid::Uuid;

use super::validate::{DialogCatalog, KnowledgeBaseSummary, ModelKind};
use crate::Result;

#[derive(Default)]
pub(crate) struct MemoryCatalog {
    pub knowledge_bases: HashMap<Uuid, KnowledgeBaseSummary>,
    pub models: Vec<(String, ModelKind)>,
    pub dialogs: Vec<(Uuid, String)>,
    pub lookups: usize,
}

impl MemoryCatalog {
    pub fn with_kb(mut self, embd_id: &str, chunk_num: i64) -> (Self, Uuid) {
        let id = Uuid::now_v7();
        self.knowledge_bases.insert(id, KnowledgeBaseSummary {
            id,
            embd_id: embd_id.to_owned(),
            chunk_num,
        });
        (self, id)
    }

    pub fn with_model(mut self, name: &str, kind: ModelKind) -> Self {
        self.models.push((name.to_owned(), kind));
        self
    }
}

impl DialogCatalog for MemoryCatalog {
    async fn find_accessible_knowledge_base(
        &mut self,
        _tenant_id: Uuid,
        kb_id: Uuid,
    ) -> Result<Option<KnowledgeBaseSummary>> {
        self.lookups += 1;
        Ok(self.knowledge_bases.get(&kb_id).cloned())
    }

    async fn model_exists(
        &mut self,
        _tenant_id: Uuid,
        model_id: &str,
        kind: ModelKind,
    ) -> Result<bool> {
        self.lookups += 1;
        Ok(self
            .models
            .iter()
            .any(|(name, k)| name == model_id && *k == kind))
    }

    async fn dialog_name_taken(
        &mut self,
        _tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool> {
        Ok(self
            .dialogs
            .iter()
            .any(|(id, n)| n == name && Some(*id) != excluding))
    }
}
