//! Crawl statistics
//!
//! Counters collected by the pagination driver while it runs, and a plain
//! text rendering of them for the end-of-crawl summary.

use std::time::Duration;

/// Counters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Listing pages the driver attempted
    pub pages_requested: u64,

    /// Listing pages fetched successfully
    pub pages_fetched: u64,

    /// Listing pages that failed after all retries
    pub pages_failed: u64,

    /// Fetched listing pages that produced no summaries
    pub empty_pages: u64,

    /// Snippets seen across all listing pages
    pub items_discovered: u64,

    /// Snippets that did not become records
    pub items_skipped: u64,

    /// Records in the final set
    pub records: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Share of discovered items that became records, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.items_discovered == 0 {
            return 0.0;
        }
        (self.records as f64 / self.items_discovered as f64) * 100.0
    }
}

/// Renders statistics as human-readable lines
pub fn format_statistics(stats: &CrawlStats) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");
    out.push_str(&format!(
        "Listing pages: {} requested, {} fetched, {} failed, {} empty\n",
        stats.pages_requested, stats.pages_fetched, stats.pages_failed, stats.empty_pages
    ));
    out.push_str(&format!(
        "Items: {} discovered, {} skipped\n",
        stats.items_discovered, stats.items_skipped
    ));
    out.push_str(&format!(
        "Records: {} ({:.2}% of discovered items)\n",
        stats.records,
        stats.success_rate()
    ));
    out.push_str(&format!(
        "Elapsed: {:.1}s\n",
        stats.elapsed.as_secs_f64()
    ));

    out
}

/// Prints statistics to stderr, keeping stdout free for the report
pub fn print_statistics(stats: &CrawlStats) {
    eprint!("{}", format_statistics(stats));
}
