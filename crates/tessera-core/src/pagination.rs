//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// A request for a page of results.
///
/// [`new`](PageRequest::new) and deserialization clamp the size; a literal
/// built from the public fields is taken as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UncheckedPageRequest")]
pub struct PageRequest {
    /// The page number (0-indexed).
    pub page: u64,
    /// The number of items per page.
    pub size: u64,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_SIZE: u64 = 20;
    /// The maximum allowed page size.
    pub const MAX_SIZE: u64 = 500;

    /// Creates a new page request. Sizes are clamped to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }

    /// Row offset for `OFFSET`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Row count for `LIMIT`.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Deserialize)]
struct UncheckedPageRequest {
    #[serde(default)]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

const fn default_size() -> u64 {
    PageRequest::DEFAULT_SIZE
}

impl From<UncheckedPageRequest> for PageRequest {
    fn from(raw: UncheckedPageRequest) -> Self {
        Self::new(raw.page, raw.size)
    }
}

/// A page of results together with totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub content: Vec<T>,
    /// The current page number (0-indexed).
    pub page: u64,
    /// The requested page size.
    pub size: u64,
    /// Number of matching items across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// Total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total_elements.div_ceil(self.size)
        }
    }

    /// Returns true if there is a next page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages()
    }

    /// Returns true if there is a previous page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offset_and_limit() {
        let req = PageRequest::new(2, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_request_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 10_000).size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(0, 0).size, 1);
    }

    #[test]
    fn test_deserialized_page_request_is_clamped() {
        let req: PageRequest = serde_json::from_str(r#"{"page": 3, "size": 0}"#).unwrap();
        assert_eq!(req, PageRequest::new(3, 1));

        let req: PageRequest = serde_json::from_str(r#"{"size": 1000000}"#).unwrap();
        assert_eq!(req, PageRequest::new(0, PageRequest::MAX_SIZE));

        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::first());
    }

    #[test]
    fn test_page_request_first() {
        let req = PageRequest::default();
        assert_eq!(req.page, 0);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), PageRequest::DEFAULT_SIZE);
    }

    #[test]
    fn test_page_navigation() {
        let first: Page<i32> = Page::new(vec![1, 2, 3], PageRequest::new(0, 10), 25);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last: Page<i32> = Page::new(vec![1, 2], PageRequest::new(2, 10), 22);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_page_empty() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::new(0, 10), 0);
        assert!(page.is_empty());
        assert_eq!(page.len(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_last_possible_page_has_no_next() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::new(u64::MAX, 20), 0);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let page: Page<i32> = Page::new(Vec::new(), PageRequest::new(u64::MAX, 1), u64::MAX);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(0, 10), 3);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.content, vec![2, 4, 6]);
        assert_eq!(mapped.total_elements, 3);
    }
}
