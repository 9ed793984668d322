//! Page-number pagination shared by list endpoints

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum page size accepted from clients
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Resolve missing values against an endpoint-specific default limit
    pub fn resolve(&self, default_limit: i64) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(default_limit),
        )
    }
}

/// A resolved, always-valid page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Out-of-range values are clamped (page >= 1, 1 <= limit <= 100)
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned alongside list results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            pages: (total + request.limit() - 1) / request.limit(),
        }
    }
}

/// One page of items plus its pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
