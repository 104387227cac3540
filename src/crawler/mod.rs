//! Crawler module for listing traversal and item enrichment
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retries
//! - Markup parsing behind a small selector-based document adapter
//! - Listing page and detail page extraction
//! - Pagination, ranking and aggregation of the final record set

mod detail;
mod document;
mod driver;
mod fetcher;
mod listing;

pub use detail::DetailExtractor;
pub use document::{css, Document, Node};
pub use driver::{crawl, CrawlOutcome, PaginationDriver, SkippedItem};
pub use fetcher::{build_http_client, PageFetcher};
pub use listing::{ListingExtractor, SnippetResult};
