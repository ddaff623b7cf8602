//! `knowledge_bases` table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum KnowledgeBaseConstraints {
    #[strum(serialize = "knowledge_bases_chunk_num_min")]
    ChunkNumMin,
    #[strum(serialize = "knowledge_bases_updated_after_created")]
    UpdatedAfterCreated,
}

impl KnowledgeBaseConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::ChunkNumMin => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<KnowledgeBaseConstraints> for String {
    #[inline]
    fn from(val: KnowledgeBaseConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for KnowledgeBaseConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
