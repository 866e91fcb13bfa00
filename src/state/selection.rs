/// Pagination over the file list.
///
/// The list is split into fixed-size pages. The current page is re-clamped
/// whenever the number of files changes so it never points past the end.

use std::ops::Range;

/// Page size used when the config does not set one
pub const DEFAULT_PAGE_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// ceil(total / page_size)
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Keep the current page inside [0, page_count - 1]
    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total).saturating_sub(1);
        self.current = self.current.min(last);
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.current + 1 < self.page_count(total)
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    /// Move forward one page; no-op on the last page
    pub fn next(&mut self, total: usize) -> bool {
        if self.has_next(total) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; no-op on the first page
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to the page that contains `index`
    pub fn show_index(&mut self, index: usize, total: usize) {
        self.current = index / self.page_size;
        self.clamp(total);
    }

    /// Index range of the visible page
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = (self.current * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_entries_make_three_pages() {
        let pages = Pagination::new(2);
        assert_eq!(pages.page_count(5), 3);
        assert_eq!(pages.page_count(0), 0);
        assert_eq!(pages.page_count(4), 2);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut pages = Pagination::new(2);
        assert!(!pages.previous());
        assert_eq!(pages.current_page(), 0);

        assert!(pages.next(5));
        assert!(pages.next(5));
        assert!(!pages.next(5));
        assert_eq!(pages.current_page(), 2);
        assert_eq!(pages.visible_range(5), 4..5);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pages = Pagination::new(2);
        pages.next(5);
        pages.next(5);
        pages.clamp(0);
        assert_eq!(pages.current_page(), 0);
        assert_eq!(pages.visible_range(0), 0..0);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let pages = Pagination::new(0);
        assert_eq!(pages.page_size(), 1);
        assert_eq!(pages.page_count(3), 3);
    }

    #[test]
    fn test_show_index() {
        let mut pages = Pagination::new(2);
        pages.show_index(3, 5);
        assert_eq!(pages.current_page(), 1);
        assert_eq!(pages.visible_range(5), 2..4);
    }
}
