//! Pagination driver - main crawl orchestration logic
//!
//! This module contains the crawl loop that walks the listing pages in
//! order, extracts their summaries, enriches each one from its detail page
//! and appends the ranked records to the record set.

use crate::config::{validate, Config, PageErrorPolicy, RankPolicy};
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::listing::ListingExtractor;
use crate::output::CrawlStats;
use crate::record::{Detail, Record, RecordSet, Summary};
use crate::url::listing_url;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::Instant;

/// An item that was found on a listing page but did not become a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Listing page index
    pub page: u32,
    /// Zero-based position of the snippet on its page
    pub position: usize,
    /// Item id, when the summary got far enough to have one
    pub item_id: Option<String>,
    /// Why the item was dropped
    pub reason: String,
}

/// Everything a crawl produced, including partial results after an abort
#[derive(Debug)]
pub struct CrawlOutcome {
    pub records: RecordSet,
    pub stats: CrawlStats,
    pub skipped: Vec<SkippedItem>,
    /// The error that stopped the crawl early, if any
    pub aborted: Option<HarvestError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    /// True when every planned page was visited (or early stop kicked in)
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// A summary waiting for its detail page
struct PendingItem {
    position: usize,
    reserved_rank: Option<u32>,
    summary: Summary,
}

/// Walks listing pages and assembles the ranked record set
pub struct PaginationDriver {
    config: Config,
    fetcher: PageFetcher,
    listing: ListingExtractor,
    detail: DetailExtractor,
}

impl PaginationDriver {
    /// Creates a driver from a configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PaginationDriver)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration, selector, or HTTP client
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;

        let fetcher = PageFetcher::new(&config.http)?;
        let listing = ListingExtractor::new(&config.selectors, &config.endpoints.base_url)?;
        let detail = DetailExtractor::new(&config.selectors)?;

        Ok(Self {
            config,
            fetcher,
            listing,
            detail,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl to completion
    ///
    /// Pages `0..=max_pages` are processed in increasing order, items in the
    /// order their page lists them. A failing item is skipped and recorded in
    /// [`CrawlOutcome::skipped`]; a failing listing page is skipped or ends
    /// the crawl according to `on_page_error`. Records gathered before an
    /// abort are kept in the outcome.
    pub async fn run(&self) -> CrawlOutcome {
        let settings = &self.config.crawl;
        let started_at = Utc::now();
        let start_time = Instant::now();

        let mut records = RecordSet::new();
        let mut stats = CrawlStats::default();
        let mut skipped = Vec::new();
        let mut aborted: Option<HarvestError> = None;
        let mut next_rank: u32 = 1;
        let mut empty_streak: u32 = 0;

        tracing::info!(
            "Crawling top {} list for category {} ({} pages)",
            settings.purchase_type,
            settings.category,
            u64::from(settings.max_pages) + 1
        );

        for page in 0..=settings.max_pages {
            let url = match listing_url(
                &self.config.endpoints.base_url,
                settings.purchase_type,
                &settings.category,
                page,
            ) {
                Ok(url) => url,
                Err(e) => {
                    aborted = Some(e.into());
                    break;
                }
            };

            stats.pages_requested += 1;
            let body = match self.fetcher.fetch_with_retry(url.as_str()).await {
                Ok(body) => {
                    stats.pages_fetched += 1;
                    body
                }
                Err(e) => {
                    stats.pages_failed += 1;
                    match settings.on_page_error {
                        PageErrorPolicy::Skip => {
                            tracing::warn!("Skipping listing page {}: {}", page, e);
                            continue;
                        }
                        PageErrorPolicy::Abort => {
                            tracing::error!("Aborting crawl at listing page {}: {}", page, e);
                            aborted = Some(HarvestError::PageAborted { page, source: e });
                            break;
                        }
                    }
                }
            };

            let mut pending = Vec::new();
            for (position, result) in self.listing.extract_html(&body).into_iter().enumerate() {
                stats.items_discovered += 1;
                match result {
                    Ok(summary) => {
                        let reserved_rank = match settings.rank_policy {
                            RankPolicy::Discovery => Some(take_rank(&mut next_rank)),
                            RankPolicy::Completed => None,
                        };
                        pending.push(PendingItem {
                            position,
                            reserved_rank,
                            summary,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Skipping item {} on page {}: {}", position, page, e);
                        stats.items_skipped += 1;
                        skipped.push(SkippedItem {
                            page,
                            position,
                            item_id: None,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            tracing::info!("Listing page {}: {} items", page, pending.len());

            if pending.is_empty() {
                stats.empty_pages += 1;
                empty_streak += 1;
                let limit = settings.stop_after_empty_pages;
                if limit > 0 && empty_streak >= limit {
                    tracing::info!(
                        "Stopping after {} consecutive empty listing pages",
                        empty_streak
                    );
                    break;
                }
                continue;
            }
            empty_streak = 0;

            // Ordered buffering keeps results in discovery order whatever
            // order the fetches complete in
            let details: Vec<Result<Detail, HarvestError>> = stream::iter(pending.iter())
                .map(|item| self.fetch_detail(&item.summary))
                .buffered(settings.detail_concurrency)
                .collect()
                .await;

            for (item, detail) in pending.into_iter().zip(details) {
                match detail {
                    Ok(detail) => {
                        let rank = match item.reserved_rank {
                            Some(rank) => rank,
                            None => take_rank(&mut next_rank),
                        };
                        tracing::info!("Processed #{}: {}", rank, item.summary.title);
                        records.push(Record::new(rank, item.summary, detail));
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Skipping item {} ({}): {}",
                            item.summary.item_id,
                            item.summary.title,
                            e
                        );
                        stats.items_skipped += 1;
                        skipped.push(SkippedItem {
                            page,
                            position: item.position,
                            item_id: Some(item.summary.item_id),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        stats.records = records.len() as u64;
        stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl finished: {} records from {} listing pages in {:?}",
            stats.records,
            stats.pages_fetched,
            stats.elapsed
        );

        CrawlOutcome {
            records,
            stats,
            skipped,
            aborted,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Fetches and extracts one item's detail page
    async fn fetch_detail(&self, summary: &Summary) -> Result<Detail, HarvestError> {
        let body = self.fetcher.fetch(&summary.detail_url).await?;
        Ok(self.detail.extract_html(&body)?)
    }
}

/// Hands out the next rank
fn take_rank(next_rank: &mut u32) -> u32 {
    let rank = *next_rank;
    *next_rank += 1;
    rank
}

/// Runs a complete crawl
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran; check `aborted` for an early stop
/// * `Err(HarvestError)` - The crawl could not be set up
///
/// # Example
///
/// ```no_run
/// use market_harvest::config::Config;
/// use market_harvest::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = crawl(Config::default()).await?;
/// for record in &outcome.records {
///     println!("{} {}", record.rank, record.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlOutcome, HarvestError> {
    let driver = PaginationDriver::new(config)?;
    Ok(driver.run().await)
}
