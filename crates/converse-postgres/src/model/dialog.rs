//! Persisted dialog configurations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::dialogs;
use crate::types::RecordStatus;

/// A stored dialog row.
///
/// `llm_setting` and `prompt_config` are kept as JSON objects; their shape is
/// owned by the caller.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = dialogs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Dialog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub llm_id: String,
    pub llm_setting: serde_json::Value,
    pub prompt_config: serde_json::Value,
    pub similarity_threshold: f64,
    pub vector_similarity_weight: f64,
    pub top_n: i32,
    pub top_k: i32,
    pub rerank_id: String,
    /// Linked knowledge bases in caller order.
    pub kb_ids: Vec<Option<Uuid>>,
    pub status: RecordStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Dialog {
    /// Returns the linked knowledge base ids, skipping SQL nulls.
    pub fn kb_ids(&self) -> Vec<Uuid> {
        self.kb_ids.iter().flatten().copied().collect()
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        !self.status.is_valid()
    }

    #[inline]
    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }

    #[inline]
    pub fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}

/// A fully assembled dialog ready for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dialogs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDialog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub llm_id: String,
    pub llm_setting: serde_json::Value,
    pub prompt_config: serde_json::Value,
    pub similarity_threshold: f64,
    pub vector_similarity_weight: f64,
    pub top_n: i32,
    pub top_k: i32,
    pub rerank_id: String,
    pub kb_ids: Vec<Option<Uuid>>,
}

/// Column changes for an existing dialog. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = dialogs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateDialog {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub llm_id: Option<String>,
    pub llm_setting: Option<serde_json::Value>,
    pub prompt_config: Option<serde_json::Value>,
    pub similarity_threshold: Option<f64>,
    pub vector_similarity_weight: Option<f64>,
    pub top_n: Option<i32>,
    pub top_k: Option<i32>,
    pub rerank_id: Option<String>,
    pub kb_ids: Option<Vec<Option<Uuid>>>,
    pub status: Option<RecordStatus>,
}

impl From<NewDialog> for UpdateDialog {
    fn from(dialog: NewDialog) -> Self {
        Self {
            name: Some(dialog.name),
            description: Some(dialog.description),
            icon: Some(dialog.icon),
            llm_id: Some(dialog.llm_id),
            llm_setting: Some(dialog.llm_setting),
            prompt_config: Some(dialog.prompt_config),
            similarity_threshold: Some(dialog.similarity_threshold),
            vector_similarity_weight: Some(dialog.vector_similarity_weight),
            top_n: Some(dialog.top_n),
            top_k: Some(dialog.top_k),
            rerank_id: Some(dialog.rerank_id),
            kb_ids: Some(dialog.kb_ids),
            status: None,
        }
    }
}
