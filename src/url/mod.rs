//! URL handling module for Market-Harvest
//!
//! Listing pages and detail pages share one base path and differ only in
//! their query string:
//!
//! - listing: `{base}?id=apps_topselling_{type}&cat={category}&start={offset}&num={per_page}`
//! - detail: `{base}?id={item_id}`

use crate::config::{PurchaseType, ITEMS_PER_PAGE};
use url::{form_urlencoded, Url};

/// Prefix of the relative detail link found on listing pages
pub const DETAIL_LINK_PREFIX: &str = "/details?id=";

/// Builds the URL of one listing page
///
/// # Arguments
///
/// * `base_url` - The marketplace base path
/// * `purchase_type` - Free or paid list
/// * `category` - Category code
/// * `page` - Zero-based page index
///
/// # Example
///
/// ```
/// use market_harvest::config::PurchaseType;
/// use market_harvest::url::listing_url;
///
/// let url = listing_url("https://market.android.com/details", PurchaseType::Free, "GAME", 2).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://market.android.com/details?id=apps_topselling_free&cat=GAME&start=48&num=24"
/// );
/// ```
pub fn listing_url(
    base_url: &str,
    purchase_type: PurchaseType,
    category: &str,
    page: u32,
) -> Result<Url, url::ParseError> {
    let list_id = format!("apps_topselling_{}", purchase_type);
    let start = start_offset(page).to_string();
    let num = ITEMS_PER_PAGE.to_string();

    Url::parse_with_params(
        base_url,
        &[
            ("id", list_id.as_str()),
            ("cat", category),
            ("start", start.as_str()),
            ("num", num.as_str()),
        ],
    )
}

/// Offset of the first item on a listing page
pub fn start_offset(page: u32) -> u64 {
    u64::from(ITEMS_PER_PAGE) * u64::from(page)
}

/// Builds the URL of an item's detail page
pub fn detail_url(base_url: &str, item_id: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(base_url, &[("id", item_id)])
}

/// Derives an item id from the href of a listing title link
///
/// Accepts both the relative form (`/details?id=com.example.app`) and an
/// absolute link ending in the same path. Returns `None` when the prefix is
/// missing or nothing follows it. The id is percent-decoded so that
/// [`detail_url`] can encode it again exactly once.
pub fn item_id_from_href(href: &str) -> Option<String> {
    let (_, id) = href.trim().split_once(DETAIL_LINK_PREFIX)?;
    // Listing links sometimes carry tracking parameters after the id
    let id = id.split('&').next().unwrap_or(id).trim();
    let id: String = form_urlencoded::parse(format!("id={}", id).as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())?;

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
