use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::knowledge_bases;
use crate::types::RecordStatus;

/// A knowledge base (dataset) a dialog can retrieve from.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = knowledge_bases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct KnowledgeBase {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Embedding model identifier, `name@factory`.
    pub embd_id: String,
    /// Number of parsed chunks; zero means nothing can be retrieved.
    pub chunk_num: i64,
    pub status: RecordStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
