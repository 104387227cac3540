//! Record types for harvested items
//!
//! A record starts life as a [`Summary`] read from a listing page, is
//! completed by the [`Detail`] read from the item's own page, and is frozen
//! once [`RecordSet::push`] accepts it.

mod normalize;

pub use normalize::{
    normalize_price, parse_install_count, parse_rating, price_from_button, split_install_range,
    strip_platform_suffix, InstallRange, FREE_PRICE_LABEL, ZERO_PRICE,
};

use std::fmt;

/// Fields readable from a listing page alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub item_id: String,
    pub detail_url: String,
    pub developer: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
}

/// Fields only available on an item's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail {
    pub updated_at: Option<String>,
    pub version: Option<String>,
    pub min_platform_version: Option<String>,
    pub category: Option<String>,
    pub install_range: Option<String>,
    pub install_min: Option<String>,
    pub install_max: Option<String>,
    pub size: Option<String>,
}

/// One ranked item with all of its collected attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub rank: u32,
    pub title: String,
    pub developer: Option<String>,
    pub price: Option<String>,
    pub item_id: String,
    pub detail_url: String,
    pub rating: Option<String>,
    pub updated_at: Option<String>,
    pub version: Option<String>,
    pub min_platform_version: Option<String>,
    pub category: Option<String>,
    pub install_range: Option<String>,
    pub install_min: Option<String>,
    pub install_max: Option<String>,
    pub size: Option<String>,
}

impl Record {
    /// Merges a summary and its detail under the given rank
    pub fn new(rank: u32, summary: Summary, detail: Detail) -> Self {
        Self {
            rank,
            title: summary.title,
            developer: summary.developer,
            price: summary.price,
            item_id: summary.item_id,
            detail_url: summary.detail_url,
            rating: summary.rating,
            updated_at: detail.updated_at,
            version: detail.version,
            min_platform_version: detail.min_platform_version,
            category: detail.category,
            install_range: detail.install_range,
            install_min: detail.install_min,
            install_max: detail.install_max,
            size: detail.size,
        }
    }

    /// Returns a field as report text; absent values become the empty string
    pub fn value(&self, field: Field) -> String {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();

        match field {
            Field::Rank => self.rank.to_string(),
            Field::Title => self.title.clone(),
            Field::Developer => optional(&self.developer),
            Field::Price => optional(&self.price),
            Field::ItemId => self.item_id.clone(),
            Field::DetailUrl => self.detail_url.clone(),
            Field::Rating => optional(&self.rating),
            Field::UpdatedAt => optional(&self.updated_at),
            Field::Version => optional(&self.version),
            Field::MinPlatformVersion => optional(&self.min_platform_version),
            Field::Category => optional(&self.category),
            Field::InstallRange => optional(&self.install_range),
            Field::InstallMin => optional(&self.install_min),
            Field::InstallMax => optional(&self.install_max),
            Field::Size => optional(&self.size),
        }
    }

    /// All fields in report column order
    pub fn values(&self) -> Vec<String> {
        Field::ALL.iter().map(|field| self.value(*field)).collect()
    }
}

/// The closed set of record fields, in report column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Rank,
    Title,
    Developer,
    Price,
    ItemId,
    DetailUrl,
    Rating,
    UpdatedAt,
    Version,
    MinPlatformVersion,
    Category,
    InstallRange,
    InstallMin,
    InstallMax,
    Size,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Field::Rank,
        Field::Title,
        Field::Developer,
        Field::Price,
        Field::ItemId,
        Field::DetailUrl,
        Field::Rating,
        Field::UpdatedAt,
        Field::Version,
        Field::MinPlatformVersion,
        Field::Category,
        Field::InstallRange,
        Field::InstallMin,
        Field::InstallMax,
        Field::Size,
    ];

    /// Column name used in report headers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Title => "title",
            Self::Developer => "developer",
            Self::Price => "price",
            Self::ItemId => "item_id",
            Self::DetailUrl => "detail_url",
            Self::Rating => "rating",
            Self::UpdatedAt => "updated_at",
            Self::Version => "version",
            Self::MinPlatformVersion => "min_platform_version",
            Self::Category => "category",
            Self::InstallRange => "install_range",
            Self::InstallMin => "install_min",
            Self::InstallMax => "install_max",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, append-only collection of completed records
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; ranks must arrive in increasing order
    pub fn push(&mut self, record: Record) {
        debug_assert!(
            self.records.last().map_or(true, |last| last.rank < record.rank),
            "record ranks must be strictly increasing"
        );
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Ranks of all records, in order
    pub fn ranks(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.rank).collect()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
