//! Cross-resource consistency checks run before a dialog is persisted.
//!
//! The checks never write. Lookups go through [`DialogCatalog`], which the
//! storage layer implements; each check short-circuits on the first violation
//! and names the offending identifier.

use std::collections::HashSet;
use std::future::Future;

use uuid::Uuid;

use super::model::{DialogConfig, PromptConfig};
use crate::{Error, Result};

/// Tracing target for dialog validation.
pub const TRACING_TARGET: &str = "converse_core::dialog::validate";

/// Built-in rerank models accepted without a tenant lookup.
pub const BUILTIN_RERANK_MODELS: [&str; 2] =
    ["BAAI/bge-reranker-v2-m3", "maidalun1020/bce-reranker-base_v1"];

/// Kind of model a dialog may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Chat,
    Embedding,
    Rerank,
}

/// The parts of a knowledge base the validator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseSummary {
    pub id: Uuid,
    /// Embedding model identifier, possibly qualified as `model@provider`.
    pub embd_id: String,
    /// Number of ingested chunks.
    pub chunk_num: i64,
}

impl KnowledgeBaseSummary {
    /// Embedding-model family of this knowledge base.
    pub fn embedding_family(&self) -> &str {
        embedding_family(&self.embd_id)
    }
}

/// Strips the provider qualifier from a model identifier.
///
/// `BAAI/bge-large-zh-v1.5@BAAI` becomes `BAAI/bge-large-zh-v1.5`; an
/// unqualified identifier is returned as is.
pub fn embedding_family(model_id: &str) -> &str {
    model_id
        .rsplit_once('@')
        .map_or(model_id, |(family, _provider)| family)
}

/// Read-only lookups required by [`ConsistencyValidator`].
pub trait DialogCatalog {
    /// Returns the knowledge base if it exists and the tenant may use it.
    fn find_accessible_knowledge_base(
        &mut self,
        tenant_id: Uuid,
        kb_id: Uuid,
    ) -> impl Future<Output = Result<Option<KnowledgeBaseSummary>>> + Send;

    /// Returns `true` if the tenant has a model of the given kind.
    fn model_exists(
        &mut self,
        tenant_id: Uuid,
        model_id: &str,
        kind: ModelKind,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Returns `true` if another valid dialog of the tenant uses `name`.
    fn dialog_name_taken(
        &mut self,
        tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Runs the consistency checks against a [`DialogCatalog`].
pub struct ConsistencyValidator<'a, C> {
    catalog: &'a mut C,
}

impl<'a, C> ConsistencyValidator<'a, C>
where
    C: DialogCatalog + Send,
{
    pub fn new(catalog: &'a mut C) -> Self {
        Self { catalog }
    }

    /// Checks that every dataset is accessible, parsed, and that all of them
    /// share one embedding-model family.
    ///
    /// An empty list passes without further checks.
    pub async fn validate_datasets(&mut self, tenant_id: Uuid, kb_ids: &[Uuid]) -> Result<()> {
        if kb_ids.is_empty() {
            return Ok(());
        }

        let mut families = HashSet::new();
        for &kb_id in kb_ids {
            let knowledge_base = self
                .catalog
                .find_accessible_knowledge_base(tenant_id, kb_id)
                .await?
                .ok_or_else(|| {
                    Error::authorization().with_message(format!("You don't own the dataset {kb_id}"))
                })?;

            if knowledge_base.chunk_num == 0 {
                return Err(Error::invalid_input()
                    .with_message(format!("The dataset {kb_id} doesn't own parsed file")));
            }

            families.insert(knowledge_base.embedding_family().to_owned());
        }

        if families.len() > 1 {
            tracing::debug!(
                target: TRACING_TARGET,
                %tenant_id,
                families = ?families,
                "Datasets use different embedding models"
            );
            return Err(
                Error::authorization().with_message("Datasets use different embedding models.\"")
            );
        }

        Ok(())
    }

    /// Checks that `model_id` names a model of `kind` available to the tenant.
    pub async fn validate_model_reference(
        &mut self,
        tenant_id: Uuid,
        model_id: &str,
        kind: ModelKind,
    ) -> Result<()> {
        if kind == ModelKind::Rerank && BUILTIN_RERANK_MODELS.contains(&model_id) {
            return Ok(());
        }

        if self.catalog.model_exists(tenant_id, model_id, kind).await? {
            return Ok(());
        }

        let field = match kind {
            ModelKind::Chat => "model_name",
            ModelKind::Embedding => "embedding_model",
            ModelKind::Rerank => "rerank_model",
        };
        Err(Error::invalid_input().with_message(format!("`{field}` {model_id} doesn't exist")))
    }

    /// Checks that every required parameter appears as `{key}` in the system
    /// template.
    pub fn validate_template_parameters(prompt: &PromptConfig) -> Result<()> {
        let unused = prompt
            .parameters
            .iter()
            .filter(|parameter| !parameter.optional)
            .find(|parameter| !prompt.system.contains(&parameter.placeholder()));

        match unused {
            Some(parameter) => Err(Error::invalid_input()
                .with_message(format!("Parameter '{}' is not used", parameter.key))),
            None => Ok(()),
        }
    }

    /// Checks that no other valid dialog of the tenant is named `name`.
    ///
    /// Check-then-act: the storage layer backs this with a unique index.
    pub async fn validate_unique_name(
        &mut self,
        tenant_id: Uuid,
        name: &str,
        excluding: Option<Uuid>,
    ) -> Result<()> {
        if self
            .catalog
            .dialog_name_taken(tenant_id, name, excluding)
            .await?
        {
            return Err(
                Error::invalid_input().with_message("Duplicated chat name in creating chat.")
            );
        }

        Ok(())
    }

    /// Runs every check in pipeline order, stopping at the first failure.
    ///
    /// `excluding` is the id of the dialog being updated, if any.
    pub async fn validate_all(
        &mut self,
        dialog: &DialogConfig,
        excluding: Option<Uuid>,
    ) -> Result<()> {
        let tenant_id = dialog.tenant_id;

        self.validate_datasets(tenant_id, &dialog.kb_ids).await?;
        self.validate_model_reference(tenant_id, &dialog.llm_id, ModelKind::Chat)
            .await?;
        if let Some(rerank_id) = dialog.rerank_model() {
            self.validate_model_reference(tenant_id, rerank_id, ModelKind::Rerank)
                .await?;
        }
        self.validate_unique_name(tenant_id, &dialog.name, excluding)
            .await?;
        Self::validate_template_parameters(&dialog.prompt_config)?;

        tracing::debug!(
            target: TRACING_TARGET,
            %tenant_id,
            dialog_id = %dialog.id,
            datasets = dialog.kb_ids.len(),
            "Dialog configuration is consistent"
        );

        Ok(())
    }
}
