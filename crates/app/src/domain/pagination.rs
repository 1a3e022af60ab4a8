//! Pagination

use serde::Serialize;

/// Page request for listings. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Clamp `page` to at least 1 and `page_size` to `1..=100`.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let pagination = Pagination::new(0, 500);

        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.page_size(), Pagination::MAX_PAGE_SIZE);
        assert_eq!(pagination.offset(), 0);

        assert_eq!(Pagination::new(3, 0).page_size(), 1);
    }

    #[test]
    fn pagination_offset_skips_previous_pages() {
        let pagination = Pagination::new(3, 20);

        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);
        assert_eq!(Pagination::default(), Pagination::new(1, 20));
    }
}
