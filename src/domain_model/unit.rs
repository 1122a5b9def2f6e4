use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page request, always within `1..=MAX_PAGE_SIZE` items.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Page {
    page: u32,
    page_size: u32,
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = match page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        Page { page, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn has_more(&self, total_count: i64) -> bool {
        total_count > i64::from(self.page) * i64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Raw `?page=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(q: PageQuery) -> Self {
        Page::new(q.page.unwrap_or(1), q.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_out_of_range_values() {
        assert_eq!(Page::new(0, 0), Page::new(1, DEFAULT_PAGE_SIZE));
        assert_eq!(Page::new(3, 500).page_size(), MAX_PAGE_SIZE);
        assert_eq!(Page::new(3, 20).offset(), 40);
    }

    #[test]
    fn has_more_compares_total_with_consumed_items() {
        let page = Page::new(2, 10);
        assert!(page.has_more(21));
        assert!(!page.has_more(20));
        assert!(!Page::new(1, 10).has_more(0));
    }

    #[test]
    fn query_defaults_apply() {
        let page: Page = PageQuery::default().into();
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), DEFAULT_PAGE_SIZE);
    }
}
