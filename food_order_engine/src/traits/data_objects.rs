use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::OrderStatusType;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A request for one page of results. Pages are numbered from 1.
///
/// The fields may hold anything a caller sends. [`Pagination::page_number`] and [`Pagination::page_size`] give the
/// normalised values, and every query goes through those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagination")]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

#[derive(Deserialize)]
struct RawPagination {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    size: u32,
}

impl From<RawPagination> for Pagination {
    fn from(raw: RawPagination) -> Self {
        Self::new(raw.page, raw.size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    /// Creates a new pagination request. A page of zero is treated as the first page; a size of zero falls back to
    /// the default page size, and sizes above [`MAX_PAGE_SIZE`] are clamped.
    pub fn new(page: u32, size: u32) -> Self {
        let raw = Self { page, size };
        Self { page: raw.page_number(), size: raw.page_size() }
    }

    /// The requested page, never less than 1.
    pub fn page_number(&self) -> u32 {
        self.page.max(1)
    }

    /// The requested page size, with the same defaults and limits as [`Pagination::new`].
    pub fn page_size(&self) -> u32 {
        match self.size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page_number() - 1) * self.limit()
    }

    /// Describes this page in the context of a result set of `total_rows` rows.
    pub fn paging(&self, total_rows: i64) -> Paging {
        let size = self.limit();
        let total_pages = (total_rows.max(0) + size - 1) / size;
        Paging { page: self.page_number(), rows_per_page: self.page_size(), total_rows, total_pages }
    }
}

/// Page information returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub page: u32,
    pub rows_per_page: u32,
    pub total_rows: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paging: Paging,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, paging: Paging) -> Self {
        Self { items, paging }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An inclusive date range. Either end may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since: Some(since), until: Some(until) }
    }

    pub fn is_open(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }
}

/// Criteria for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub customer_id: Option<String>,
    pub statuses: Vec<OrderStatusType>,
    pub date_range: DateRange,
}

impl OrderQueryFilter {
    pub fn with_customer_id<S: Into<String>>(mut self, customer_id: S) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_statuses(mut self, statuses: &[OrderStatusType]) -> Self {
        self.statuses.extend_from_slice(statuses);
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.statuses.is_empty() && self.date_range.is_open()
    }
}
