//! Configuration module for Market-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) describes the
//! reference crawl: 36 pages of the free GAME list.
//!
//! # Example
//!
//! ```no_run
//! use market_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Will crawl up to page index {}", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, EndpointConfig, HttpConfig, PageErrorPolicy, PurchaseType, RankPolicy,
    SelectorConfig, ITEMS_PER_PAGE,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
