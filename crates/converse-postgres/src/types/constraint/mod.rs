//! Named database constraints, parsed from violation errors.

mod dialogs;
mod knowledge_bases;
mod tenant_models;
mod tenants;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::dialogs::DialogConstraints;
pub use self::knowledge_bases::KnowledgeBaseConstraints;
pub use self::tenant_models::TenantModelConstraints;
pub use self::tenants::TenantConstraints;

/// Any known constraint, grouped by table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Tenant(TenantConstraints),
    TenantModel(TenantModelConstraints),
    KnowledgeBase(KnowledgeBaseConstraints),
    Dialog(DialogConstraints),
}

/// What kind of rule a constraint enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// Timestamp ordering.
    Chronological,
    /// Domain-specific rules.
    BusinessLogic,
    /// Unique keys and indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Parses a constraint name as reported by PostgreSQL.
    ///
    /// ```
    /// use converse_postgres::types::{ConstraintViolation, DialogConstraints};
    ///
    /// assert_eq!(
    ///     ConstraintViolation::new("dialogs_tenant_name_unique_idx"),
    ///     Some(ConstraintViolation::Dialog(DialogConstraints::TenantNameUnique)),
    /// );
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        match prefix {
            "tenants" => TenantConstraints::new(constraint).map(Self::Tenant),
            "tenant" => TenantModelConstraints::new(constraint).map(Self::TenantModel),
            "knowledge" => KnowledgeBaseConstraints::new(constraint).map(Self::KnowledgeBase),
            "dialogs" => DialogConstraints::new(constraint).map(Self::Dialog),
            _ => None,
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::Tenant(_) => "tenants",
            ConstraintViolation::TenantModel(_) => "tenant_models",
            ConstraintViolation::KnowledgeBase(_) => "knowledge_bases",
            ConstraintViolation::Dialog(_) => "dialogs",
        }
    }

    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Tenant(c) => c.categorize(),
            ConstraintViolation::TenantModel(c) => c.categorize(),
            ConstraintViolation::KnowledgeBase(c) => c.categorize(),
            ConstraintViolation::Dialog(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Tenant(c) => write!(f, "{c}"),
            ConstraintViolation::TenantModel(c) => write!(f, "{c}"),
            ConstraintViolation::KnowledgeBase(c) => write!(f, "{c}"),
            ConstraintViolation::Dialog(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {value}"))
    }
}
