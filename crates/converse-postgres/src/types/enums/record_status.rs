use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Soft-deletion marker shared by dialogs and knowledge bases.
///
/// Corresponds to the `RECORD_STATUS` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::RecordStatus"]
pub enum RecordStatus {
    /// Visible to reads and counted by uniqueness checks.
    #[default]
    #[db_rename = "valid"]
    #[serde(rename = "valid")]
    #[strum(serialize = "valid")]
    Valid,

    /// Soft-deleted; ignored by every lookup.
    #[db_rename = "deleted"]
    #[serde(rename = "deleted")]
    #[strum(serialize = "deleted")]
    Deleted,
}

impl RecordStatus {
    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, RecordStatus::Valid)
    }
}
