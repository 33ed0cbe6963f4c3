//! # pagecache
//!
//! Fixed-capacity LRU cache fronting a slow page book.
//!
//! ## Architecture
//! - **Recency list**: doubly-linked list over slot indices in an arena,
//!   most recently used at the head (O(1) promote, insert and evict)
//! - **Index**: AHash map from page number to arena slot (O(1) lookup)
//! - **Content**: entries borrow page content from the book; nothing is copied

#![warn(missing_docs)]

mod cache;
mod recency;
mod stats;

pub use cache::LruCache;
pub use pagebook::{Error, PageNumber, PageSource, Result};
pub use stats::CacheStats;
