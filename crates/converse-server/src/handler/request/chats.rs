use std::collections::HashSet;

use converse_postgres::types::{
    DialogFilter, DialogSortBy, DialogSortField, MAX_LIMIT, OffsetPagination, SortBy, SortOrder,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query parameters of `GET /api/v1/chats`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ListChats {
    /// 1-based page number.
    #[serde(default = "ListChats::default_page")]
    #[validate(range(min = 1, message = "`page` must be at least 1."))]
    pub page: i64,
    #[serde(default = "ListChats::default_page_size")]
    #[validate(range(min = 1, max = MAX_LIMIT, message = "`page_size` is out of range."))]
    pub page_size: i64,
    /// `create_time` or `update_time`.
    #[serde(default)]
    pub orderby: DialogSortField,
    #[serde(default = "ListChats::default_desc")]
    pub desc: bool,
    /// Case-insensitive substring of the chat name.
    pub name: Option<String>,
    /// Exact id match.
    pub id: Option<Uuid>,
}

impl ListChats {
    const fn default_page() -> i64 {
        1
    }

    const fn default_page_size() -> i64 {
        30
    }

    const fn default_desc() -> bool {
        true
    }

    pub fn filter(&self) -> DialogFilter {
        DialogFilter {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn sort_by(&self) -> DialogSortBy {
        let order = if self.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        SortBy::new(self.orderby, order)
    }

    pub fn pagination(&self) -> OffsetPagination {
        OffsetPagination::from_page(self.page, self.page_size).with_count()
    }
}

impl Default for ListChats {
    fn default() -> Self {
        Self {
            page: Self::default_page(),
            page_size: Self::default_page_size(),
            orderby: DialogSortField::default(),
            desc: Self::default_desc(),
            name: None,
            id: None,
        }
    }
}

/// Body of `DELETE /api/v1/chats`.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct DeleteChats {
    #[serde(default)]
    #[validate(length(min = 1, message = "Invalid ids parameter"))]
    pub ids: Vec<Uuid>,
}

impl DeleteChats {
    /// Returns `true` if some id appears more than once.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.ids.len());
        !self.ids.iter().all(|id| seen.insert(*id))
    }
}
