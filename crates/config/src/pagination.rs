//! List pagination defaults

use serde::Deserialize;

/// Pagination configuration
///
/// ```toml
/// [pagination]
/// page_size = 10
/// max_page_size = 100
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Clamp a requested page size into `1..=max_page_size`
    pub fn clamp(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let config = PaginationConfig::default();
        assert_eq!(config.clamp(None), 10);
        assert_eq!(config.clamp(Some(0)), 1);
        assert_eq!(config.clamp(Some(500)), 100);
        assert_eq!(config.clamp(Some(25)), 25);
    }
}
