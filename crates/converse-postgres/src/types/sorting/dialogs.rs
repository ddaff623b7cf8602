#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::SortBy;

/// Columns a dialog listing can be ordered by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, Display, EnumString)]
pub enum DialogSortField {
    #[default]
    #[serde(rename = "create_time")]
    #[strum(serialize = "create_time")]
    CreatedAt,
    #[serde(rename = "update_time")]
    #[strum(serialize = "update_time")]
    UpdatedAt,
}

pub type DialogSortBy = SortBy<DialogSortField>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_external_names() {
        assert_eq!(
            "update_time".parse::<DialogSortField>().unwrap(),
            DialogSortField::UpdatedAt
        );
        assert!("name".parse::<DialogSortField>().is_err());
        assert!(DialogSortBy::default().is_desc());
    }
}
