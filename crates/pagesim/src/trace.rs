//! Lookup trace parser using nom
//!
//! Trace format:
//! ```text
//! # warm the cache
//! 1, 2, 3-5     # ranges are inclusive
//! 7 1
//! 5
//! ```
//!
//! Items are page numbers or ranges `a-b` (descending when `a > b`),
//! separated by commas and/or whitespace. `#` comments run to end of line.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::{many1, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};
use pagebook::PageNumber;

/// One trace item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceItem {
    /// Single page lookup
    Page(PageNumber),
    /// Inclusive run of lookups from the first page to the second
    Range(PageNumber, PageNumber),
}

impl TraceItem {
    fn pages(self) -> Box<dyn Iterator<Item = PageNumber>> {
        match self {
            TraceItem::Page(page) => Box::new(std::iter::once(page)),
            TraceItem::Range(start, end) if start <= end => Box::new(start..=end),
            TraceItem::Range(start, end) => Box::new((end..=start).rev()),
        }
    }

    fn len(self) -> usize {
        match self {
            TraceItem::Page(_) => 1,
            TraceItem::Range(start, end) => start.abs_diff(end).saturating_add(1),
        }
    }

    fn max_page(self) -> PageNumber {
        match self {
            TraceItem::Page(page) => page,
            TraceItem::Range(start, end) => start.max(end),
        }
    }
}

/// Parsed sequence of page lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    items: Vec<TraceItem>,
}

impl Trace {
    /// Parse a trace from text
    pub fn parse(input: &str) -> Result<Self> {
        let (_, items) = all_consuming(trace)(input)
            .map_err(|e| anyhow!("invalid trace: {}", e))?;

        if items.is_empty() {
            bail!("trace contains no page lookups");
        }

        Ok(Self { items })
    }

    /// Read and parse a trace file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trace file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in trace file {}", path.display()))
    }

    /// Page numbers in lookup order
    pub fn pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.items.iter().flat_map(|item| item.pages())
    }

    /// Number of lookups the trace expands to
    pub fn lookup_count(&self) -> usize {
        self.items
            .iter()
            .fold(0usize, |total, item| total.saturating_add(item.len()))
    }

    /// Highest page number referenced
    pub fn max_page(&self) -> Option<PageNumber> {
        self.items.iter().map(|item| item.max_page()).max()
    }
}

fn page_number(input: &str) -> IResult<&str, PageNumber> {
    map_res(digit1, str::parse)(input)
}

fn item(input: &str) -> IResult<&str, TraceItem> {
    map(
        pair(page_number, opt(preceded(char('-'), page_number))),
        |(start, end)| match end {
            Some(end) => TraceItem::Range(start, end),
            None => TraceItem::Page(start),
        },
    )(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), not_line_ending)(input)
}

fn separator(input: &str) -> IResult<&str, ()> {
    value((), many1(alt((multispace1, tag(","), comment))))(input)
}

fn trace(input: &str) -> IResult<&str, Vec<TraceItem>> {
    delimited(
        opt(separator),
        separated_list0(separator, item),
        opt(separator),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pages(input: &str) -> Vec<PageNumber> {
        Trace::parse(input).unwrap().pages().collect()
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(pages("1,2,3"), vec![1, 2, 3]);
        assert_eq!(pages("1 2\t3\n4"), vec![1, 2, 3, 4]);
        assert_eq!(pages(" 7 , 1 ,5 "), vec![7, 1, 5]);
    }

    #[test]
    fn test_parse_ranges() {
        assert_eq!(pages("1-5"), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages("3-1, 9"), vec![3, 2, 1, 9]);
        assert_eq!(pages("4-4"), vec![4]);
    }

    #[test]
    fn test_parse_comments() {
        let input = "# warm up\n1-3 # first pass\n\n2\n# done";
        assert_eq!(pages(input), vec![1, 2, 3, 2]);
    }

    #[test]
    fn test_len_and_max_page() {
        let trace = Trace::parse("1-5, 7, 1, 5").unwrap();

        assert_eq!(trace.lookup_count(), 8);
        assert_eq!(trace.max_page(), Some(7));
    }

    #[test]
    fn test_empty_trace() {
        assert!(Trace::parse("").is_err());
        assert!(Trace::parse("  # nothing here\n").is_err());
    }

    #[test]
    fn test_invalid_trace() {
        assert!(Trace::parse("1, two, 3").is_err());
        assert!(Trace::parse("-1").is_err());
        assert!(Trace::parse("1-").is_err());
        assert!(Trace::parse("99999999999999999999999").is_err());
    }

    #[test]
    fn test_load_trace_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# scenario").unwrap();
        writeln!(file, "1-5").unwrap();
        writeln!(file, "7 1 5").unwrap();

        let trace = Trace::load(file.path()).unwrap();
        assert_eq!(
            trace.pages().collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 7, 1, 5]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Trace::load(dir.path().join("missing.trace"));
        assert!(result.is_err());
    }
}
