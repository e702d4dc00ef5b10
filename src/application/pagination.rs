//! Offset pagination shared by the public listings.

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Cap for the plain listing endpoint.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Cap for the filtered public endpoint.
pub const MAX_FILTERED_PAGE_SIZE: u32 = 50;

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Clamped pagination window: `page >= 1`, `limit` within `[1, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn from_query(query: PageQuery, max_limit: u32) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, max_limit);
        Self { page, limit }
    }

    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Ceiling division; zero matches means zero pages.
    pub fn total_pages(self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params = PageParams::from_query(PageQuery::default(), MAX_PAGE_SIZE);
        assert_eq!(params, PageParams { page: 1, limit: 10 });
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_is_floored_at_one() {
        let params = PageParams::from_query(
            PageQuery {
                page: Some(0),
                limit: None,
            },
            MAX_PAGE_SIZE,
        );
        assert_eq!(params.page, 1);
    }

    #[test]
    fn limit_clamps_to_endpoint_cap() {
        let params = PageParams::from_query(
            PageQuery {
                page: None,
                limit: Some(500),
            },
            MAX_FILTERED_PAGE_SIZE,
        );
        assert_eq!(params.limit, 50);

        let params = PageParams::from_query(
            PageQuery {
                page: None,
                limit: Some(0),
            },
            MAX_PAGE_SIZE,
        );
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn offset_advances_by_whole_pages() {
        let params = PageParams::from_query(
            PageQuery {
                page: Some(3),
                limit: Some(20),
            },
            MAX_PAGE_SIZE,
        );
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams { page: 1, limit: 10 };
        assert_eq!(params.total_pages(0), 0);
        assert_eq!(params.total_pages(10), 1);
        assert_eq!(params.total_pages(11), 2);
    }
}
