use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 9;

/// Resolved position of a page inside a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub last_page: i64,
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Clamps `requested` into `1..=last_page` for `total` items.
    ///
    /// Missing, zero or negative page numbers resolve to page 1; pages past the
    /// end resolve to the last page; an empty set is page 1 of 1.
    pub fn resolve(total: i64, requested: Option<i64>, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0);
        let last_page = (total / per_page + i64::from(total % per_page != 0)).max(1);
        let page = requested.unwrap_or(1).clamp(1, last_page);
        Self {
            page,
            last_page,
            offset: (page - 1) * per_page,
            limit: per_page,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total: i64) -> Self {
        Self {
            items,
            page: window.page,
            last_page: window.last_page,
            per_page: window.limit,
            total,
        }
    }
}
