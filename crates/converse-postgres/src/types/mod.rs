//! Constraints, enumerations and query parameter types.

mod constraint;
mod enums;
mod filtering;
mod pagination;
mod sorting;

pub use self::constraint::{
    ConstraintCategory, ConstraintViolation, DialogConstraints, KnowledgeBaseConstraints,
    TenantConstraints, TenantModelConstraints,
};
pub use self::enums::{ModelType, RecordStatus};
pub use self::filtering::DialogFilter;
pub use self::pagination::{MAX_LIMIT, OffsetPage, OffsetPagination};
pub use self::sorting::{DialogSortBy, DialogSortField, SortBy, SortOrder};
