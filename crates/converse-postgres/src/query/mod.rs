//! Repository traits implemented on [`PgConnection`].
//!
//! Every lookup ignores soft-deleted rows.
//!
//! [`PgConnection`]: crate::PgConnection

mod dialog;
mod knowledge_base;
mod tenant;
mod tenant_model;

pub use self::dialog::DialogRepository;
pub use self::knowledge_base::KnowledgeBaseRepository;
pub use self::tenant::TenantRepository;
pub use self::tenant_model::TenantModelRepository;
