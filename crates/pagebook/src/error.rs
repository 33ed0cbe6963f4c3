//! Error types for pagebook

use std::fmt;

/// Result type alias for book and cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the book and by caches built on top of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A construction parameter was rejected (zero size or capacity)
    InvalidArgument(String),

    /// Page number outside `[0, size)`
    PageOutOfRange {
        /// Requested page number
        page: usize,
        /// Number of pages in the book
        size: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::PageOutOfRange { page, size } => {
                write!(f, "Page {} out of range (book has {} pages)", page, size)
            }
        }
    }
}

impl std::error::Error for Error {}
