//! pagesim - replays page lookup traces through the LRU page cache

mod replay;
mod trace;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pagebook::Book;
use tracing::{info, warn};

use crate::replay::replay;
use crate::trace::Trace;

/// Trace replayed when none is given: fill a 5-page cache, evict twice, hit once
const DEFAULT_TRACE: &str = "1-5 7 1 5";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of pages in the book
    #[arg(short, long, default_value_t = 10)]
    pages: usize,

    /// Cache capacity (number of pages)
    #[arg(short, long, default_value_t = 5)]
    capacity: usize,

    /// Simulated latency of every book fetch, in milliseconds
    #[arg(short, long, default_value_t = 0)]
    latency_ms: u64,

    /// Inline lookup trace, e.g. "1-5, 7 1 5"
    #[arg(short, long, conflicts_with = "trace_file")]
    trace: Option<String>,

    /// File holding the lookup trace
    #[arg(short = 'f', long)]
    trace_file: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let trace = match (&args.trace, &args.trace_file) {
        (Some(text), _) => Trace::parse(text).context("failed to parse --trace")?,
        (None, Some(path)) => Trace::load(path)?,
        (None, None) => Trace::parse(DEFAULT_TRACE)?,
    };

    info!("Starting pagesim v{}", env!("CARGO_PKG_VERSION"));
    info!("Book size: {} pages", args.pages);
    info!("Cache capacity: {} pages", args.capacity);
    info!("Fetch latency: {} ms", args.latency_ms);
    info!("Trace length: {} lookups", trace.lookup_count());

    if args.capacity >= args.pages {
        warn!(
            "Cache capacity {} covers the whole book ({} pages); no eviction will occur",
            args.capacity, args.pages
        );
    }

    let book = Book::with_latency(args.pages, Duration::from_millis(args.latency_ms))
        .context("failed to create book")?;
    let report = replay(&book, args.capacity, &trace)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_table());
    }

    Ok(())
}
