//! Listing page extraction
//!
//! Each listing page holds up to a page worth of item "snippets". A snippet
//! yields one [`Summary`]: title and item id are required, everything else
//! is optional and logged by name when it cannot be read.

use crate::config::SelectorConfig;
use crate::crawler::document::{css, Document, Node};
use crate::record::{parse_rating, price_from_button, Summary};
use crate::url::{detail_url, item_id_from_href};
use crate::{ExtractionError, ExtractionResult};
use scraper::Selector;

/// Outcome of reading one snippet
pub type SnippetResult = ExtractionResult<Summary>;

/// Reads item summaries from listing pages
pub struct ListingExtractor {
    snippet: Selector,
    details: Selector,
    title: Selector,
    price: Selector,
    developer: Selector,
    rating: Selector,
    title_css: String,
    base_url: String,
}

impl ListingExtractor {
    /// Compiles the listing selectors
    ///
    /// # Arguments
    ///
    /// * `selectors` - Selector configuration
    /// * `base_url` - Base path used to build each item's detail URL
    pub fn new(selectors: &SelectorConfig, base_url: &str) -> ExtractionResult<Self> {
        Ok(Self {
            snippet: css(&selectors.snippet)?,
            details: css(&selectors.details)?,
            title: css(&selectors.title)?,
            price: css(&selectors.price)?,
            developer: css(&selectors.developer)?,
            rating: css(&selectors.rating)?,
            title_css: selectors.title.clone(),
            base_url: base_url.to_string(),
        })
    }

    /// Extracts one result per snippet, in page order
    ///
    /// A failed snippet does not stop the others; callers decide what to do
    /// with each error.
    pub fn extract(&self, document: &Document) -> Vec<SnippetResult> {
        document
            .select(&self.snippet)
            .map(|snippet| self.extract_snippet(snippet))
            .collect()
    }

    /// Parses raw markup and extracts its snippets
    pub fn extract_html(&self, raw: &str) -> Vec<SnippetResult> {
        self.extract(&Document::parse(raw))
    }

    fn extract_snippet(&self, snippet: Node<'_>) -> SnippetResult {
        // Title, price and developer live under the details sub-tree when it
        // exists; fall back to the snippet itself otherwise
        let details = snippet.first(&self.details).unwrap_or(snippet);

        let title_node = details
            .first(&self.title)
            .ok_or_else(|| ExtractionError::MissingNode {
                field: "title".to_string(),
                selector: self.title_css.clone(),
            })?;

        let title = title_node
            .attribute("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractionError::MissingAttribute {
                field: "title".to_string(),
                attribute: "title".to_string(),
            })?
            .to_string();

        let href = title_node
            .attribute("href")
            .ok_or_else(|| ExtractionError::MissingAttribute {
                field: "item_id".to_string(),
                attribute: "href".to_string(),
            })?;

        let item_id = item_id_from_href(href).ok_or_else(|| ExtractionError::PatternMismatch {
            field: "item_id".to_string(),
            text: href.to_string(),
        })?;

        let detail_url = detail_url(&self.base_url, &item_id)
            .map_err(|_| ExtractionError::PatternMismatch {
                field: "item_id".to_string(),
                text: item_id.clone(),
            })?
            .to_string();

        let price = details
            .first(&self.price)
            .map(|node| price_from_button(&node.text()))
            .filter(|p| !p.is_empty());

        let developer = details
            .first(&self.developer)
            .map(|node| node.text())
            .filter(|d| !d.is_empty());

        let rating = snippet
            .first(&self.rating)
            .and_then(|node| node.attribute("title"))
            .and_then(parse_rating);

        let missing: Vec<&str> = [
            ("price", price.is_none()),
            ("developer", developer.is_none()),
            ("rating", rating.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            tracing::warn!(
                "Item {} is missing optional fields: {}",
                item_id,
                missing.join(", ")
            );
        }

        Ok(Summary {
            title,
            item_id,
            detail_url,
            developer,
            price,
            rating,
        })
    }
}
