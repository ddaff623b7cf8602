//! Diesel models for the tables the service reads and writes.

mod dialog;
mod knowledge_base;
mod tenant;

pub use self::dialog::{Dialog, NewDialog, UpdateDialog};
pub use self::knowledge_base::KnowledgeBase;
pub use self::tenant::{Tenant, TenantApiToken, UpdateTenant};
