#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum number of items per page.
pub const MAX_LIMIT: i64 = 1000;

/// Limit and offset applied to a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct OffsetPagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
    /// Whether to run the extra count query.
    #[serde(default)]
    pub include_count: bool,
}

impl OffsetPagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
            include_count: false,
        }
    }

    /// Converts a 1-based page number and page size into limit and offset.
    pub fn from_page(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_LIMIT);
        Self {
            limit: page_size,
            offset: (page - 1).saturating_mul(page_size),
            include_count: false,
        }
    }

    pub fn with_count(mut self) -> Self {
        self.include_count = true;
        self
    }

    /// Returns the 1-based page number.
    pub fn page_number(&self) -> i64 {
        (self.offset / self.limit) + 1
    }

    pub fn page_size(&self) -> i64 {
        self.limit
    }
}

impl Default for OffsetPagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            include_count: false,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    /// Total matching rows, present only when `include_count` was set.
    pub total: Option<i64>,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, total: Option<i64>) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
        }
    }

    pub fn map<U, F>(self, f: F) -> OffsetPage<U>
    where
        F: FnMut(T) -> U,
    {
        OffsetPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// Returns whether rows remain after this page, if the total is known.
    pub fn has_more(&self, pagination: &OffsetPagination) -> Option<bool> {
        self.total
            .map(|total| (pagination.offset + self.items.len() as i64) < total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(OffsetPagination::new(0, -5), OffsetPagination::new(1, 0));
        assert_eq!(OffsetPagination::new(5000, 0).limit, MAX_LIMIT);
    }

    #[test]
    fn pages_are_one_based() {
        let pagination = OffsetPagination::from_page(3, 30);
        assert_eq!(pagination.offset, 60);
        assert_eq!(pagination.page_number(), 3);
        assert_eq!(pagination.page_size(), 30);

        let first = OffsetPagination::from_page(0, 30);
        assert_eq!(first.offset, 0);
    }

    #[test]
    fn has_more_needs_total() {
        let pagination = OffsetPagination::from_page(1, 2).with_count();
        let page = OffsetPage::new(vec![1, 2], Some(3));
        assert_eq!(page.has_more(&pagination), Some(true));
        assert_eq!(OffsetPage::new(vec![1], None).has_more(&pagination), None);
        assert_eq!(page.map(|n| n * 10).items, vec![10, 20]);
    }
}
