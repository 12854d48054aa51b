//! API request and response types
//!
//! Shared types for list endpoints, choice tables and plain message
//! responses.

use serde::{Deserialize, Serialize};
use tutor_config::PaginationConfig;

/// Page query parameters (`?page=2&page_size=20`)
///
/// Pages start at 1. The page size falls back to the configured default
/// and is clamped to the configured maximum.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Resolve into a concrete page
    pub fn resolve(&self, config: &PaginationConfig) -> Page {
        Page {
            number: self.page.unwrap_or(1).max(1),
            size: config.clamp(self.page_size),
        }
    }
}

/// A resolved page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

/// Paginated response for list endpoints
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page, starting at 1
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

impl<T> PaginatedResponse<T> {
    /// Create a new paginated response
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            data,
            total,
            page: page.number,
            page_size: page.size,
        }
    }
}

/// Plain message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A `(value, label)` choice
#[derive(Debug, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Render a static choice table
pub fn choices(table: &'static [(&'static str, &'static str)]) -> Vec<Choice> {
    table
        .iter()
        .map(|&(value, label)| Choice { value, label })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = PageParams::default().resolve(&PaginationConfig::default());
        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_offset_and_clamp() {
        let params = PageParams {
            page: Some(3),
            page_size: Some(500),
        };
        let page = params.resolve(&PaginationConfig::default());
        assert_eq!(page.size, 100);
        assert_eq!(page.offset(), 200);

        let zero = PageParams {
            page: Some(0),
            page_size: None,
        };
        assert_eq!(zero.resolve(&PaginationConfig::default()).number, 1);
    }
}
