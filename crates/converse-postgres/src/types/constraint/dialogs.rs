//! `dialogs` table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum DialogConstraints {
    #[strum(serialize = "dialogs_name_length")]
    NameLength,
    #[strum(serialize = "dialogs_llm_setting_object")]
    LlmSettingObject,
    #[strum(serialize = "dialogs_prompt_config_object")]
    PromptConfigObject,
    #[strum(serialize = "dialogs_top_n_min")]
    TopNMin,
    #[strum(serialize = "dialogs_top_k_min")]
    TopKMin,

    #[strum(serialize = "dialogs_tenant_name_unique_idx")]
    TenantNameUnique,

    #[strum(serialize = "dialogs_updated_after_created")]
    UpdatedAfterCreated,
}

impl DialogConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::NameLength
            | Self::LlmSettingObject
            | Self::PromptConfigObject
            | Self::TopNMin
            | Self::TopKMin => ConstraintCategory::Validation,
            Self::TenantNameUnique => ConstraintCategory::Uniqueness,
            Self::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<DialogConstraints> for String {
    #[inline]
    fn from(val: DialogConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for DialogConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
