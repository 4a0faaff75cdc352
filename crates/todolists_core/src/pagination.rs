//! Page-window arithmetic for list listings.
//!
//! # Responsibility
//! - Normalize requested page parameters into one effective window.
//! - Derive the slice bounds and the next-page indicator from that window.
//!
//! # Invariants
//! - Pure: no I/O, no clock, no shared state.
//! - The same normalized window drives both the store query and the reply
//!   metadata, so `next_page_number` always agrees with the returned page.
//!
//! Normalization order:
//! 1. `page_number <= 0` becomes `1`.
//! 2. `page_size <= 0` becomes the configured default size.
//! 3. `page_size >= max_page_size` becomes `max_page_size`.

/// Ceiling applied when no explicit configuration is supplied.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 50;
/// Page size used when a request leaves `page_size` unset (zero).
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page-size limits applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_page_size: u32,
    pub default_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Normalized, 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page_number: i64,
    page_size: i64,
}

impl PageWindow {
    /// Clamps raw request values into an effective window.
    pub fn normalize(page_number: i64, page_size: i64, limits: PageLimits) -> Self {
        let page_number = if page_number <= 0 { 1 } else { page_number };

        let max_page_size = i64::from(limits.max_page_size.max(1));
        let default_page_size = i64::from(limits.default_page_size.max(1));
        let page_size = if page_size <= 0 {
            default_page_size
        } else {
            page_size
        };
        let page_size = if page_size >= max_page_size {
            max_page_size
        } else {
            page_size
        };

        Self {
            page_number,
            page_size,
        }
    }

    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Exclusive end index of this page: `page_number * page_size`.
    ///
    /// Saturates instead of overflowing for absurdly large page numbers.
    pub fn last_index(&self) -> i64 {
        self.page_number.saturating_mul(self.page_size)
    }

    /// Number of rows skipped before this page starts.
    pub fn offset(&self) -> i64 {
        self.last_index() - self.page_size
    }

    /// Maximum number of rows in this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Next page number as a string, or empty when this is the last page.
    pub fn next_page_number(&self, total_count: i64) -> String {
        if total_count > self.last_index() {
            (self.page_number + 1).to_string()
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageLimits, PageWindow};

    fn limits(max_page_size: u32) -> PageLimits {
        PageLimits {
            max_page_size,
            default_page_size: 10,
        }
    }

    #[test]
    fn second_page_of_five_has_next_page() {
        let window = PageWindow::normalize(2, 2, limits(50));

        assert_eq!(window.offset(), 2);
        assert_eq!(window.limit(), 2);
        assert_eq!(window.next_page_number(5), "3");
    }

    #[test]
    fn last_partial_page_has_no_next_page() {
        let window = PageWindow::normalize(3, 2, limits(50));

        assert_eq!(window.offset(), 4);
        assert_eq!(window.next_page_number(5), "");
    }

    #[test]
    fn exact_fit_has_no_next_page() {
        let window = PageWindow::normalize(2, 2, limits(50));
        assert_eq!(window.next_page_number(4), "");
    }

    #[test]
    fn non_positive_page_number_behaves_like_first_page() {
        let first = PageWindow::normalize(1, 5, limits(50));

        assert_eq!(PageWindow::normalize(0, 5, limits(50)), first);
        assert_eq!(PageWindow::normalize(-7, 5, limits(50)), first);
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn oversized_page_is_clamped_to_ceiling() {
        let at_ceiling = PageWindow::normalize(1, 50, limits(50));
        let above_ceiling = PageWindow::normalize(1, 500, limits(50));

        assert_eq!(at_ceiling.page_size(), 50);
        assert_eq!(above_ceiling, at_ceiling);
    }

    #[test]
    fn zero_page_size_uses_default() {
        let window = PageWindow::normalize(1, 0, limits(50));
        assert_eq!(window.page_size(), 10);

        let small_ceiling = PageWindow::normalize(1, 0, limits(4));
        assert_eq!(small_ceiling.page_size(), 4);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let window = PageWindow::normalize(i64::MAX, 50, limits(50));

        assert_eq!(window.last_index(), i64::MAX);
        assert_eq!(window.next_page_number(1_000), "");
    }

    #[test]
    fn empty_collection_has_no_next_page() {
        let window = PageWindow::normalize(1, 10, limits(50));
        assert_eq!(window.next_page_number(0), "");
    }
}
