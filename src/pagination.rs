use serde::{Deserialize, Serialize};

use crate::models::JobPosting;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Requested window over a result set. Always holds positive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Non-positive or missing values fall back to the defaults instead of failing.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: coerce(page, DEFAULT_PAGE),
            limit: coerce(limit, DEFAULT_LIMIT),
        }
    }

    /// Same coercion as `new`, for raw text such as command-line or query-string input.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let number = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(number(page), number(limit))
    }

    /// A single window covering every row.
    pub fn unbounded() -> Self {
        Self {
            page: 1,
            limit: u32::MAX,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1).max(1),
            limit: self.limit,
        }
    }

    pub fn describe(&self, total: u64) -> Pagination {
        Pagination {
            total,
            page: self.page,
            limit: self.limit,
            pages: total_pages(total, self.limit),
        }
    }
}

fn coerce(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) if v > 0 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => default,
    }
}

pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub data: Vec<JobPosting>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_invalid_values_are_coerced() {
        assert_eq!(PageRequest::new(Some(0), Some(-5)), PageRequest::default());
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("abc"), Some("")), PageRequest::default());

        let req = PageRequest::parse(Some(" 3 "), Some("25"));
        assert_eq!(req.page(), 3);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(Some(2), Some(10));
        assert_eq!(req.offset(), 10);

        let req = PageRequest::new(Some(5), Some(7));
        assert_eq!(req.offset(), 28);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(12, 10), 2);
        assert_eq!(total_pages(5, u32::MAX), 1);
    }

    #[test]
    fn test_describe_page_beyond_range() {
        let meta = PageRequest::new(Some(3), Some(10)).describe(5);
        assert_eq!(
            meta,
            Pagination {
                total: 5,
                page: 3,
                limit: 10,
                pages: 1
            }
        );
    }

    #[test]
    fn test_previous_never_drops_below_first_page() {
        let first = PageRequest::default();
        assert_eq!(first.previous().page(), 1);
        assert_eq!(first.next().page(), 2);
        assert_eq!(first.next().previous(), first);
    }
}
