//! # pagebook
//!
//! Backing store of addressable pages for the page cache.
//!
//! ## Model
//! - Fixed number of pages, numbered `0..size`
//! - Page content is immutable and owned by the book
//! - Fetching is the slow path (optional simulated latency)

#![warn(missing_docs)]

mod book;
mod error;
mod source;

pub use book::Book;
pub use error::{Error, Result};
pub use source::{PageNumber, PageSource};
