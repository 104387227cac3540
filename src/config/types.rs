use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Listing rows per page; fixed by the marketplace index
pub const ITEMS_PER_PAGE: u32 = 24;

/// Main configuration structure for Market-Harvest
///
/// Every key is optional in the TOML file; missing keys take the defaults
/// shown on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub http: HttpConfig,
    pub endpoints: EndpointConfig,
    pub selectors: SelectorConfig,
}

/// What to crawl and how the crawl reacts to failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Last listing page index to fetch (inclusive, so `max_pages + 1` pages)
    pub max_pages: u32,

    /// Marketplace category code (e.g. "GAME")
    pub category: String,

    /// Which top-selling list to walk
    pub purchase_type: PurchaseType,

    /// Maximum number of detail pages fetched at once for a single listing page
    pub detail_concurrency: usize,

    /// Stop after this many consecutive empty listing pages (0 disables)
    pub stop_after_empty_pages: u32,

    /// When ranks are handed out
    pub rank_policy: RankPolicy,

    /// What to do with a listing page that still fails after its retries
    pub on_page_error: PageErrorPolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 35,
            category: "GAME".to_string(),
            purchase_type: PurchaseType::Free,
            detail_concurrency: 4,
            stop_after_empty_pages: 0,
            rank_policy: RankPolicy::Completed,
            on_page_error: PageErrorPolicy::Skip,
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,

    /// Extra attempts for a failed listing page
    pub page_retries: u32,

    /// Pause between listing page attempts (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("market-harvest/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            accept_invalid_certs: false,
            page_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Marketplace endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Base path shared by listing and detail pages
    pub base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://market.android.com/details".to_string(),
        }
    }
}

/// CSS selectors used by the extractors
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// One node per listed item
    pub snippet: String,
    /// Sub-tree of a snippet holding title, price and developer
    pub details: String,
    /// Link carrying the `title` and `href` attributes
    pub title: String,
    pub price: String,
    pub developer: String,
    /// Node whose `title` attribute holds the rating phrase
    pub rating: String,
    /// Container of the label/value pairs on a detail page
    pub metadata: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            snippet: ".snippet".to_string(),
            details: ".details".to_string(),
            title: ".title".to_string(),
            price: ".buy-button-price".to_string(),
            developer: ".attribution".to_string(),
            rating: ".ratings".to_string(),
            metadata: ".doc-metadata".to_string(),
        }
    }
}

/// Which top-selling list to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseType {
    Free,
    Paid,
}

impl PurchaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(format!(
                "unknown purchase type '{}', expected 'free' or 'paid'",
                other
            )),
        }
    }
}

/// When a record receives its rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
    /// Only records that make it into the record set are ranked; no gaps
    Completed,
    /// Every extracted summary consumes a rank, even if its detail page fails
    Discovery,
}

/// Reaction to a listing page that could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageErrorPolicy {
    Skip,
    Abort,
}
