use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Capability of a model registered for a tenant.
///
/// Corresponds to the `MODEL_TYPE` PostgreSQL enum.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ModelType"]
pub enum ModelType {
    #[default]
    #[db_rename = "chat"]
    #[serde(rename = "chat")]
    #[strum(serialize = "chat")]
    Chat,

    #[db_rename = "embedding"]
    #[serde(rename = "embedding")]
    #[strum(serialize = "embedding")]
    Embedding,

    #[db_rename = "rerank"]
    #[serde(rename = "rerank")]
    #[strum(serialize = "rerank")]
    Rerank,
}
