//! LruCache: fixed-capacity page cache in front of a [`PageSource`]

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use pagebook::{Error, PageNumber, PageSource, Result};
use tracing::{debug, trace};

use crate::recency::RecencyList;
use crate::stats::CacheStats;

/// One resident page: its number and a borrow of the source's content
struct Entry<'a, C: ?Sized> {
    page: PageNumber,
    content: &'a C,
}

/// Least-recently-used cache of page content.
///
/// Entries borrow content from the source they were loaded from, so the
/// cache cannot outlive that source. Querying one cache against two
/// different sources is not detected: a page resident from the first source
/// is returned as a hit for the second.
///
/// # Example
/// ```
/// use pagebook::Book;
/// use pagecache::LruCache;
///
/// let book = Book::new(10).unwrap();
/// let mut cache = LruCache::new(2).unwrap();
///
/// cache.lookup_or_load(&book, 1);
/// cache.lookup_or_load(&book, 2);
/// cache.lookup_or_load(&book, 3); // evicts page 1
///
/// assert_eq!(cache.recency().collect::<Vec<_>>(), vec![3, 2]);
/// ```
pub struct LruCache<'a, C: ?Sized = str> {
    /// Page number -> slot in the recency list
    index: HashMap<PageNumber, usize, RandomState>,

    /// Resident entries, most recently used first
    recency: RecencyList<Entry<'a, C>>,

    /// Hit/miss counters
    stats: CacheStats,

    /// Maximum number of resident pages
    capacity: usize,
}

impl<'a, C: ?Sized> LruCache<'a, C> {
    /// Create an empty cache holding at most `capacity` pages
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of resident pages, must be greater than 0
    ///
    /// # Returns
    /// * `Result<LruCache>` - `Error::InvalidArgument` when `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "cache capacity must be greater than 0".to_string(),
            ));
        }

        debug!(capacity, "page cache created");
        Ok(Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            recency: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Return the content of `page`, loading it from `store` on a miss
    ///
    /// A hit moves the page to the most-recently-used position and never
    /// touches `store`. A miss fetches exactly once, inserts the page at the
    /// most-recently-used position and, if the cache was full, evicts the
    /// least recently used page.
    ///
    /// # Panics
    /// On a miss for a page number outside `store`, via the store's own
    /// bounds check. The cache is left unchanged in that case.
    pub fn lookup_or_load<S>(&mut self, store: &'a S, page: PageNumber) -> &'a C
    where
        S: PageSource<Content = C> + ?Sized,
    {
        if let Some(&slot) = self.index.get(&page) {
            if let Some(entry) = self.recency.move_to_front(slot) {
                self.stats.record_hit();
                trace!(page, "cache hit");
                return entry.content;
            }
        }

        self.stats.record_miss();
        trace!(page, "cache miss");
        let content = store.fetch_content(page);

        // Evicting first lets the new entry take over the freed slot.
        if self.recency.len() >= self.capacity {
            self.evict();
        }

        let slot = self.recency.push_front(Entry { page, content });
        self.index.insert(page, slot);
        self.stats.record_insert();

        content
    }

    /// Get a resident page's content without changing its recency
    pub fn peek(&self, page: PageNumber) -> Option<&'a C> {
        self.index
            .get(&page)
            .and_then(|&slot| self.recency.get(slot))
            .map(|entry| entry.content)
    }

    /// Check whether `page` is resident
    pub fn contains(&self, page: PageNumber) -> bool {
        self.index.contains_key(&page)
    }

    /// Resident page numbers, most recently used first
    pub fn recency(&self) -> impl ExactSizeIterator<Item = PageNumber> + '_ {
        self.recency.iter().map(|entry| entry.page)
    }

    /// Most recently used page
    pub fn mru_page(&self) -> Option<PageNumber> {
        self.recency.front().map(|entry| entry.page)
    }

    /// Least recently used page, the next eviction victim
    pub fn lru_page(&self) -> Option<PageNumber> {
        self.recency.back().map(|entry| entry.page)
    }

    /// Get the number of resident pages
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if no page is resident
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Drop every resident page and reset statistics. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.index.clear();
        self.recency.clear();
        self.stats.reset();
    }

    /// Check index/list agreement in debug builds
    pub fn debug_validate_invariants(&self) {
        self.recency.debug_validate_invariants();

        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(self.index.len(), self.recency.len());
            debug_assert!(self.recency.len() <= self.capacity);
            for (&page, &slot) in &self.index {
                let entry = self.recency.get(slot);
                debug_assert!(
                    entry.map(|entry| entry.page) == Some(page),
                    "index entry for page {} points at wrong slot {}",
                    page,
                    slot
                );
            }
        }
    }

    fn evict(&mut self) {
        if let Some(entry) = self.recency.pop_back() {
            self.index.remove(&entry.page);
            self.stats.record_eviction();
            debug!(page = entry.page, "evicted least recently used page");
        }
    }
}

impl<C: ?Sized> fmt::Debug for LruCache<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("recency", &self.recency().collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}
