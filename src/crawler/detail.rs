//! Detail page extraction
//!
//! The detail page lists its metadata as label/value pairs (`<dt>Label:</dt>
//! <dd>value</dd>`) inside a metadata container. Values are looked up by
//! their label, so reordering or inserting rows on the page does not shift
//! fields into the wrong column.

use crate::config::SelectorConfig;
use crate::crawler::document::{css, Document};
use crate::record::{split_install_range, strip_platform_suffix, Detail};
use crate::{ExtractionError, ExtractionResult};
use scraper::Selector;

/// Detail attributes addressable by label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailField {
    UpdatedAt,
    Version,
    MinPlatformVersion,
    Category,
    InstallRange,
    Size,
}

/// Known labels, lowercase and without the trailing colon
const LABELS: &[(&str, DetailField)] = &[
    ("updated", DetailField::UpdatedAt),
    ("last updated", DetailField::UpdatedAt),
    ("current version", DetailField::Version),
    ("version", DetailField::Version),
    ("requires android", DetailField::MinPlatformVersion),
    ("requires", DetailField::MinPlatformVersion),
    ("category", DetailField::Category),
    ("installs", DetailField::InstallRange),
    ("size", DetailField::Size),
];

fn field_for_label(label: &str) -> Option<DetailField> {
    let key = label.trim().trim_end_matches(':').trim().to_lowercase();
    LABELS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, field)| *field)
}

/// Reads extended item attributes from detail pages
pub struct DetailExtractor {
    metadata: Selector,
    label: Selector,
    metadata_css: String,
}

impl DetailExtractor {
    /// Compiles the detail selectors
    pub fn new(selectors: &SelectorConfig) -> ExtractionResult<Self> {
        Ok(Self {
            metadata: css(&selectors.metadata)?,
            label: css("dt")?,
            metadata_css: selectors.metadata.clone(),
        })
    }

    /// Extracts the detail attributes of one item
    ///
    /// Fails only when the metadata container is missing. Labels that do not
    /// appear on the page leave their field empty.
    pub fn extract(&self, document: &Document) -> ExtractionResult<Detail> {
        let container =
            document
                .first(&self.metadata)
                .ok_or_else(|| ExtractionError::MissingNode {
                    field: "metadata".to_string(),
                    selector: self.metadata_css.clone(),
                })?;

        let mut detail = Detail::default();

        for label in container.select(&self.label) {
            let label_text = label.text();
            let Some(field) = field_for_label(&label_text) else {
                tracing::trace!("Ignoring unknown detail label '{}'", label_text);
                continue;
            };

            let Some(value) = label
                .next_element_sibling()
                .filter(|node| node.name() == "dd")
                .map(|node| node.text())
                .filter(|text| !text.is_empty())
            else {
                continue;
            };

            let slot = match field {
                DetailField::UpdatedAt => &mut detail.updated_at,
                DetailField::Version => &mut detail.version,
                DetailField::MinPlatformVersion => &mut detail.min_platform_version,
                DetailField::Category => &mut detail.category,
                DetailField::InstallRange => &mut detail.install_range,
                DetailField::Size => &mut detail.size,
            };

            // First occurrence wins
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        detail.min_platform_version = detail
            .min_platform_version
            .as_deref()
            .map(strip_platform_suffix);

        if let Some(installs) = detail.install_range.as_deref() {
            let range = split_install_range(installs);
            detail.install_min = range.min;
            detail.install_max = range.max;
        }

        Ok(detail)
    }

    /// Parses raw markup and extracts its detail attributes
    pub fn extract_html(&self, raw: &str) -> ExtractionResult<Detail> {
        self.extract(&Document::parse(raw))
    }
}
