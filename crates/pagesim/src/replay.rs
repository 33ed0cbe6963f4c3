//! Trace replay through the LRU cache

use std::time::Instant;

use anyhow::{bail, Result};
use pagebook::{Book, PageNumber};
use pagecache::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::trace::Trace;

/// Outcome of a single lookup
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Requested page
    pub page: PageNumber,
    /// Served from the cache without fetching
    pub hit: bool,
    /// Wall time of the lookup in microseconds
    pub elapsed_us: u64,
    /// Resident pages after the lookup, most recent first
    pub recency: Vec<PageNumber>,
}

/// Totals for a whole replay
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub pages: usize,
    pub capacity: usize,
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
    pub fetches: u64,
    pub recency: Vec<PageNumber>,
}

/// Full replay report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<Step>,
    pub summary: Summary,
}

/// Replay `trace` against a fresh cache of `capacity` pages over `book`
///
/// The trace is checked against the book before the first lookup, so an
/// out-of-range page is reported as an error instead of tripping the book's
/// bounds check.
pub fn replay(book: &Book, capacity: usize, trace: &Trace) -> Result<Report> {
    if let Some(page) = trace.max_page().filter(|&page| !book.contains(page)) {
        bail!(
            "page {} is outside the book ({} pages, valid 0..{})",
            page,
            book.len(),
            book.len()
        );
    }

    let mut cache = LruCache::new(capacity)?;
    let fetches_before = book.fetch_count();
    let mut steps = Vec::with_capacity(trace.lookup_count());

    for page in trace.pages() {
        let hit = cache.contains(page);

        let start = Instant::now();
        cache.lookup_or_load(book, page);
        let elapsed_us = start.elapsed().as_micros() as u64;

        debug!(page, hit, elapsed_us, "lookup");
        steps.push(Step {
            page,
            hit,
            elapsed_us,
            recency: cache.recency().collect(),
        });
    }

    let stats = cache.stats();
    let summary = Summary {
        pages: book.len(),
        capacity: cache.capacity(),
        lookups: stats.lookups(),
        hits: stats.hits(),
        misses: stats.misses(),
        evictions: stats.evictions(),
        hit_ratio: stats.hit_ratio(),
        fetches: book.fetch_count() - fetches_before,
        recency: cache.recency().collect(),
    };

    Ok(Report { steps, summary })
}

impl Report {
    /// Render the report as a plain-text table
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        out.push_str("  step   page  result      time  recency (MRU first)\n");
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!(
                "  {:>4}  {:>5}  {:<6}  {:>8}  {:?}\n",
                i + 1,
                step.page,
                if step.hit { "hit" } else { "miss" },
                format_elapsed(step.elapsed_us),
                step.recency
            ));
        }

        let s = &self.summary;
        out.push_str(&format!(
            "\nbook: {} pages, cache capacity: {}\n",
            s.pages, s.capacity
        ));
        out.push_str(&format!(
            "lookups: {}  hits: {}  misses: {}  evictions: {}  fetches: {}\n",
            s.lookups, s.hits, s.misses, s.evictions, s.fetches
        ));
        out.push_str(&format!("hit ratio: {:.1}%\n", s.hit_ratio * 100.0));
        out.push_str(&format!("final recency: {:?}\n", s.recency));
        out
    }
}

fn format_elapsed(us: u64) -> String {
    if us >= 1_000_000 {
        format!("{:.2}s", us as f64 / 1_000_000.0)
    } else if us >= 1_000 {
        format!("{:.1}ms", us as f64 / 1_000.0)
    } else {
        format!("{}us", us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_replay_scenario() {
        let book = Book::new(10).unwrap();
        let trace = Trace::parse("1-5 7 1 5").unwrap();

        let report = replay(&book, 5, &trace).unwrap();

        assert_eq!(report.steps.len(), 8);
        assert_eq!(report.steps[4].recency, vec![5, 4, 3, 2, 1]);
        assert_eq!(report.steps[6].recency, vec![1, 7, 5, 4, 3]);
        assert!(!report.steps[6].hit);
        assert!(report.steps[7].hit);
        assert_eq!(report.summary.recency, vec![5, 1, 7, 4, 3]);
        assert_eq!(report.summary.hits, 1);
        assert_eq!(report.summary.misses, 7);
        assert_eq!(report.summary.evictions, 2);
        assert_eq!(report.summary.fetches, 7);
    }

    #[test]
    fn test_replay_rejects_out_of_range() {
        let book = Book::new(4).unwrap();
        let trace = Trace::parse("1 2 4").unwrap();

        let err = replay(&book, 2, &trace).unwrap_err();
        assert!(err.to_string().contains("page 4"));
        assert_eq!(book.fetch_count(), 0);
    }

    #[test]
    fn test_replay_rejects_zero_capacity() {
        let book = Book::new(4).unwrap();
        let trace = Trace::parse("1").unwrap();

        assert!(replay(&book, 0, &trace).is_err());
    }

    #[test]
    fn test_replay_latency_only_on_miss() {
        let latency = Duration::from_millis(20);
        let book = Book::with_latency(4, latency).unwrap();
        let trace = Trace::parse("2 2").unwrap();

        let report = replay(&book, 2, &trace).unwrap();

        let latency_us = latency.as_micros() as u64;
        assert!(report.steps[0].elapsed_us >= latency_us);
        assert!(report.steps[1].elapsed_us < latency_us);
    }

    #[test]
    fn test_report_json() {
        let book = Book::new(10).unwrap();
        let trace = Trace::parse("1 1").unwrap();
        let report = replay(&book, 2, &trace).unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["hits"], 1);
        assert_eq!(json["steps"][1]["hit"], true);
        assert_eq!(json["summary"]["recency"], serde_json::json!([1]));
    }

    #[test]
    fn test_report_table() {
        let book = Book::new(10).unwrap();
        let trace = Trace::parse("3 3").unwrap();
        let table = replay(&book, 2, &trace).unwrap().to_table();

        assert!(table.contains("miss"));
        assert!(table.contains("hit ratio: 50.0%"));
        assert!(table.contains("final recency: [3]"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(12), "12us");
        assert_eq!(format_elapsed(1_500), "1.5ms");
        assert_eq!(format_elapsed(2_000_000), "2.00s");
    }
}
