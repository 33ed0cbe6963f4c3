//! Book implementation
//!
//! A book owns `size` pages numbered `0..size`. Fetching a page through
//! [`PageSource`] may sleep for a configured latency to model a slow medium;
//! the checked accessors ([`Book::page`], [`Book::contains`]) never do.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::source::{PageNumber, PageSource};

/// Fixed-size collection of immutable pages
#[derive(Debug)]
pub struct Book {
    /// Page content, indexed by page number
    pages: Vec<String>,

    /// Simulated latency of a single fetch
    latency: Duration,

    /// Number of fetches served so far
    fetches: AtomicU64,
}

impl Book {
    /// Create a book with `size` placeholder pages and no fetch latency
    ///
    /// # Arguments
    /// * `size` - Number of pages, must be greater than 0
    ///
    /// # Returns
    /// * `Result<Book>` - `Error::InvalidArgument` when `size` is 0
    pub fn new(size: usize) -> Result<Self> {
        Self::with_latency(size, Duration::ZERO)
    }

    /// Create a book whose fetches each take `latency`
    ///
    /// # Arguments
    /// * `size` - Number of pages, must be greater than 0
    /// * `latency` - Time spent in every [`PageSource::fetch_content`] call
    pub fn with_latency(size: usize, latency: Duration) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidArgument(
                "book size must be greater than 0".to_string(),
            ));
        }

        let pages = (0..size).map(|number| format!("Page {}", number)).collect();
        debug!(size, latency_ms = latency.as_millis() as u64, "book created");

        Ok(Self {
            pages,
            latency,
            fetches: AtomicU64::new(0),
        })
    }

    /// Get the content of a page without the simulated latency
    ///
    /// # Returns
    /// * `Result<&str>` - `Error::PageOutOfRange` for numbers outside the book
    pub fn page(&self, page: PageNumber) -> Result<&str> {
        self.pages
            .get(page)
            .map(String::as_str)
            .ok_or(Error::PageOutOfRange {
                page,
                size: self.pages.len(),
            })
    }

    /// Check whether `page` names a page of this book
    pub fn contains(&self, page: PageNumber) -> bool {
        page < self.pages.len()
    }

    /// Get the number of pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false: a book holds at least one page
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get the configured fetch latency
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Number of fetches served through [`PageSource::fetch_content`]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl PageSource for Book {
    type Content = str;

    fn fetch_content(&self, page: PageNumber) -> &str {
        assert!(
            self.contains(page),
            "page {} out of range for book of {} pages",
            page,
            self.pages.len()
        );

        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.fetches.fetch_add(1, Ordering::Relaxed);
        trace!(page, "fetched page from book");

        &self.pages[page]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_book_size() {
        let book = Book::new(10).unwrap();

        assert_eq!(book.len(), 10);
        assert!(!book.is_empty());
        for number in 0..10 {
            assert!(book.contains(number));
        }
        assert!(!book.contains(10));
    }

    #[test]
    fn test_book_zero_size() {
        assert!(matches!(Book::new(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Book::with_latency(0, Duration::from_millis(5)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_placeholder_content() {
        let book = Book::new(3).unwrap();

        assert_eq!(book.page(0).unwrap(), "Page 0");
        assert_eq!(book.page(2).unwrap(), "Page 2");
    }

    #[test]
    fn test_page_out_of_range() {
        let book = Book::new(3).unwrap();

        assert_eq!(
            book.page(3),
            Err(Error::PageOutOfRange { page: 3, size: 3 })
        );
    }

    #[test]
    fn test_fetch_returns_owned_storage() {
        let book = Book::new(4).unwrap();

        let fetched = book.fetch_content(2);
        let checked = book.page(2).unwrap();
        assert!(std::ptr::eq(fetched, checked));
    }

    #[test]
    fn test_fetch_count() {
        let book = Book::new(4).unwrap();
        assert_eq!(book.fetch_count(), 0);

        book.fetch_content(1);
        book.fetch_content(1);
        book.page(1).unwrap(); // checked access is not a fetch

        assert_eq!(book.fetch_count(), 2);
    }

    #[test]
    fn test_fetch_latency() {
        let latency = Duration::from_millis(20);
        let book = Book::with_latency(2, latency).unwrap();
        assert_eq!(book.latency(), latency);

        let start = Instant::now();
        book.fetch_content(0);
        assert!(start.elapsed() >= latency);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_fetch_out_of_range_panics() {
        let book = Book::new(2).unwrap();
        book.fetch_content(2);
    }
}
