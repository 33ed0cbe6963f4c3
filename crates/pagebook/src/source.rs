//! Fetch interface consumed by caches

/// Page number within a book, valid in `[0, size)`
pub type PageNumber = usize;

/// A provider of immutable page content keyed by page number.
///
/// `fetch_content` is the expensive path a cache exists to avoid. The
/// returned reference must point at storage owned by the source and must
/// stay at the same address for as long as the source is borrowed.
pub trait PageSource {
    /// Content type of a single page
    type Content: ?Sized;

    /// Fetch the content of `page`.
    ///
    /// # Panics
    /// Implementations panic when `page` is outside the source's range.
    fn fetch_content(&self, page: PageNumber) -> &Self::Content;
}
