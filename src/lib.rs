//! Market-Harvest: a ranked marketplace listing harvester
//!
//! This crate walks the paginated "top selling" index of an application
//! marketplace, enriches every listed item with the metadata from its detail
//! page, and hands the ranked records to a report writer.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod url;

use thiserror::Error;

/// Main error type for Market-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Listing page {page} could not be fetched: {source}")]
    PageAborted { page: u32, source: FetchError },
}

/// Network or protocol failure for a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// A required field could not be read from a parsed page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to parse selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Required field '{field}' not found using selector '{selector}'")]
    MissingNode { field: String, selector: String },

    #[error("Required field '{field}' has no '{attribute}' attribute")]
    MissingAttribute { field: String, attribute: String },

    #[error("Field '{field}' does not match the expected format: '{text}'")]
    PatternMismatch { field: String, text: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Market-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome, PaginationDriver};
pub use record::{Detail, Field, Record, RecordSet, Summary};
