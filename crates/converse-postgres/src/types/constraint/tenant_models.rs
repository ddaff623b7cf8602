//! `tenant_models` table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum TenantModelConstraints {
    #[strum(serialize = "tenant_models_unique_name")]
    UniqueName,
}

impl TenantModelConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::UniqueName => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<TenantModelConstraints> for String {
    #[inline]
    fn from(val: TenantModelConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for TenantModelConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
