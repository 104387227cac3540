//! Queryable markup documents
//!
//! A thin adapter over `scraper`: parse once, then look nodes up with
//! compiled CSS selectors. No extraction logic lives here.

use crate::ExtractionError;
use scraper::{ElementRef, Html, Selector};

/// Compiles a CSS selector, reporting syntax errors as extraction errors
pub fn css(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// A parsed page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses raw markup; malformed markup is repaired, never rejected
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// All nodes matching `selector`, in document order
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = Node<'a>> + 'a {
        self.html.select(selector).map(Node)
    }

    /// The first node matching `selector`
    pub fn first(&self, selector: &Selector) -> Option<Node<'_>> {
        self.html.select(selector).next().map(Node)
    }
}

/// An element inside a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Descendants matching `selector`, in document order
    pub fn select<'b>(&self, selector: &'b Selector) -> impl Iterator<Item = Node<'a>> + 'b
    where
        'a: 'b,
    {
        self.0.select(selector).map(Node)
    }

    /// The first descendant matching `selector`
    pub fn first(&self, selector: &Selector) -> Option<Node<'a>> {
        self.0.select(selector).next().map(Node)
    }

    /// Value of an attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// Text content with runs of whitespace collapsed and the ends trimmed
    pub fn text(&self) -> String {
        self.0
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Local tag name, lowercase
    pub fn name(&self) -> &'a str {
        self.0.value().name()
    }

    /// The next sibling that is an element, skipping text and comments
    pub fn next_element_sibling(&self) -> Option<Node<'a>> {
        self.0
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(Node)
    }
}
