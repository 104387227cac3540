//! Text normalization for scraped field values
//!
//! Marketplace pages present prices, ratings and install counts as
//! human-readable phrases. Every function here is a pure transformation from
//! the raw text to the value stored on a record.

use once_cell::sync::Lazy;
use regex::Regex;

/// Label shown on the buy button of free items
pub const FREE_PRICE_LABEL: &str = "Install";

/// Price recorded for free items
pub const ZERO_PRICE: &str = "$0.00";

/// Suffix appended to prices on the buy button
const BUY_SUFFIX: &str = " Buy";

/// Suffix appended to the minimum platform version
const PLATFORM_SUFFIX: &str = " and up";

/// Delimiter between the bounds of an install range
const INSTALL_RANGE_DELIMITER: &str = " - ";

static RATING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Rating:\s*(\S+)\s+stars\b").expect("rating pattern is a valid regex")
});

/// Maps the free-install label to the zero price; other text is returned as is
pub fn normalize_price(text: &str) -> String {
    if text == FREE_PRICE_LABEL {
        ZERO_PRICE.to_string()
    } else {
        text.to_string()
    }
}

/// Turns buy-button text such as `"$0.99 Buy"` or `"Install"` into a price
pub fn price_from_button(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_suffix(BUY_SUFFIX).unwrap_or(text);
    normalize_price(text)
}

/// Removes the trailing `" and up"` from a minimum platform version
///
/// ```
/// use market_harvest::record::strip_platform_suffix;
///
/// assert_eq!(strip_platform_suffix("4.1 and up"), "4.1");
/// assert_eq!(strip_platform_suffix("Varies with device"), "Varies with device");
/// ```
pub fn strip_platform_suffix(text: &str) -> String {
    text.strip_suffix(PLATFORM_SUFFIX).unwrap_or(text).to_string()
}

/// Extracts the star value from a phrase like `"Rating: 4.3 stars out of 120 votes"`
pub fn parse_rating(phrase: &str) -> Option<String> {
    RATING_PATTERN
        .captures(phrase)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Bounds of an install range such as `"10,000 - 50,000"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

/// Splits an install range into its bounds
///
/// Both bounds are absent when the delimiter is missing. When both bounds are
/// numeric and out of order they are swapped so that `min <= max`.
pub fn split_install_range(text: &str) -> InstallRange {
    let Some((min, max)) = text.split_once(INSTALL_RANGE_DELIMITER) else {
        return InstallRange::default();
    };

    let (min, max) = (min.trim(), max.trim());

    if let (Some(low), Some(high)) = (parse_install_count(min), parse_install_count(max)) {
        if low > high {
            tracing::debug!("Install range '{}' is reversed, swapping bounds", text);
            return InstallRange {
                min: non_empty(max),
                max: non_empty(min),
            };
        }
    }

    InstallRange {
        min: non_empty(min),
        max: non_empty(max),
    }
}

/// Reads an install count like `"10,000"` or `"1,000,000+"` as a number
pub fn parse_install_count(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '+')
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
