//! `tenants` table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TenantConstraints {
    #[strum(serialize = "tenants_name_length")]
    NameLength,
    #[strum(serialize = "tenants_updated_after_created")]
    UpdatedAfterCreated,
}

impl TenantConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::NameLength => ConstraintCategory::Validation,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<TenantConstraints> for String {
    #[inline]
    fn from(val: TenantConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for TenantConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
