//! Fixed-size, 1-based pagination.

use serde::{Deserialize, Serialize};

/// Posts per page when nothing is configured.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Which page of a listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub number: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Page numbers below 1 are clamped to 1, a zero page size to 1.
    /// Listings reject page 0 before building a request.
    pub fn new(number: u64, per_page: u64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of rows to skip. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.per_page)
    }

    /// Whether the offset fits a signed 64-bit SQL `OFFSET`.
    pub fn is_addressable(&self) -> bool {
        (self.number - 1)
            .checked_mul(self.per_page)
            .is_some_and(|offset| i64::try_from(offset).is_ok())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            number: request.number,
            per_page: request.per_page,
            total_items,
            total_pages: total_items.div_ceil(request.per_page),
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// A page past the end; page 1 of an empty listing is still valid.
    pub fn is_out_of_range(&self) -> bool {
        self.number > 1 && self.number > self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_clamping() {
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(0, 10).number, 1);
        assert_eq!(PageRequest::new(1, 0).per_page, 1);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let request = PageRequest::new(u64::MAX, 10);
        assert_eq!(request.offset(), u64::MAX);
        assert!(!request.is_addressable());
        assert!(!PageRequest::new(u64::MAX, 1).is_addressable());
        assert!(PageRequest::new(1 << 40, 10).is_addressable());
    }

    #[test]
    fn test_page_bounds() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 3), 7);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let empty: Page<u8> = Page::new(vec![], PageRequest::new(1, 10), 0);
        assert!(!empty.is_out_of_range());

        let past_end: Page<u8> = Page::new(vec![], PageRequest::new(4, 3), 7);
        assert!(past_end.is_out_of_range());
    }
}
