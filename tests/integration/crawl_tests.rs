//! Integration tests for the crawler
//!
//! These tests use wiremock to serve synthetic listing and detail pages and
//! drive the full crawl end-to-end.

use market_harvest::config::{Config, PageErrorPolicy, RankPolicy};
use market_harvest::crawler::{crawl, PaginationDriver};
use market_harvest::output::{write_report, ReportFormat};
use market_harvest::HarvestError;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(server: &MockServer, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawl.max_pages = max_pages;
    config.crawl.detail_concurrency = 2;
    config.endpoints.base_url = format!("{}/details", server.uri());
    config.http.page_retries = 0;
    config.http.retry_delay_ms = 0;
    config.http.timeout_secs = 5;
    config
}

/// One listed item on a listing page
struct Item {
    id: &'static str,
    title: &'static str,
    price: &'static str,
    developer: &'static str,
    rating: &'static str,
}

fn item(id: &'static str, title: &'static str) -> Item {
    Item {
        id,
        title,
        price: "Install",
        developer: "Example Studio",
        rating: "Rating: 4.3 stars out of 120 votes",
    }
}

fn listing_page(items: &[Item]) -> String {
    let snippets: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<li class="snippet">
                    <div class="ratings" title="{rating}"></div>
                    <div class="details">
                        <a class="title" title="{title}" href="/details?id={id}">{title}</a>
                        <span class="attribution"><a>{developer}</a></span>
                        <span class="buy-button-price">{price}</span>
                    </div>
                </li>"#,
                rating = item.rating,
                title = item.title,
                id = item.id,
                developer = item.developer,
                price = item.price,
            )
        })
        .collect();

    format!(
        "<html><head><title>Top Free</title></head><body><ul>{}</ul></body></html>",
        snippets
    )
}

fn detail_page(version: &str, installs: &str) -> String {
    format!(
        r#"<html><body>
            <div class="doc-metadata">
                <dl>
                    <dt>Updated:</dt><dd><time>May 5, 2011</time></dd>
                    <dt>Current Version:</dt><dd>{version}</dd>
                    <dt>Requires Android:</dt><dd>2.2 and up</dd>
                    <dt>Category:</dt><dd>Arcade &amp; Action</dd>
                    <dt>Installs:</dt><dd>{installs}</dd>
                    <dt>Size:</dt><dd>3.1M</dd>
                </dl>
            </div>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_listing(server: &MockServer, start: u32, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("id", "apps_topselling_free"))
        .and(query_param("start", start.to_string().as_str()))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("id", id))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_items_end_to_end() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        0,
        listing_page(&[
            item("com.example.one", "First Game"),
            Item {
                price: "$1.99 Buy",
                rating: "Rating: 3.5 stars out of 12 votes",
                developer: "Other Studio",
                ..item("com.example.two", "Second Game")
            },
        ]),
        1,
    )
    .await;
    mount_detail(&server, "com.example.one", html(detail_page("1.0", "10,000 - 50,000"))).await;
    mount_detail(&server, "com.example.two", html(detail_page("2.5.1", "100 - 500"))).await;

    let config = create_test_config(&server, 0);
    let base_url = config.endpoints.base_url.clone();
    let outcome = crawl(config).await.expect("Crawl failed to start");

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.ranks(), vec![1, 2]);
    assert!(outcome.skipped.is_empty());

    let first = &outcome.records.records()[0];
    assert_eq!(first.title, "First Game");
    assert_eq!(first.item_id, "com.example.one");
    assert_eq!(first.detail_url, format!("{}?id=com.example.one", base_url));
    assert_eq!(first.price.as_deref(), Some("$0.00"));
    assert_eq!(first.developer.as_deref(), Some("Example Studio"));
    assert_eq!(first.rating.as_deref(), Some("4.3"));
    assert_eq!(first.updated_at.as_deref(), Some("May 5, 2011"));
    assert_eq!(first.version.as_deref(), Some("1.0"));
    assert_eq!(first.min_platform_version.as_deref(), Some("2.2"));
    assert_eq!(first.category.as_deref(), Some("Arcade & Action"));
    assert_eq!(first.install_min.as_deref(), Some("10,000"));
    assert_eq!(first.install_max.as_deref(), Some("50,000"));
    assert_eq!(first.size.as_deref(), Some("3.1M"));

    let second = &outcome.records.records()[1];
    assert_eq!(second.title, "Second Game");
    assert_eq!(second.price.as_deref(), Some("$1.99"));
    assert_eq!(second.developer.as_deref(), Some("Other Studio"));
    assert_eq!(second.rating.as_deref(), Some("3.5"));
    assert_eq!(second.version.as_deref(), Some("2.5.1"));
    assert_eq!(second.install_max.as_deref(), Some("500"));

    assert_eq!(outcome.stats.pages_requested, 1);
    assert_eq!(outcome.stats.items_discovered, 2);
    assert_eq!(outcome.stats.records, 2);
}

#[tokio::test]
async fn test_max_pages_zero_fetches_one_listing_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&[]), 1).await;

    let outcome = crawl(create_test_config(&server, 0)).await.unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages_requested, 1);
    assert_eq!(outcome.stats.empty_pages, 1);
}

#[tokio::test]
async fn test_max_pages_n_fetches_n_plus_one_pages_with_offsets() {
    let server = MockServer::start().await;
    for start in [0, 24, 48, 72] {
        mount_listing(&server, start, listing_page(&[]), 1).await;
    }

    let outcome = crawl(create_test_config(&server, 3)).await.unwrap();

    // Empty pages never stop the crawl unless asked to
    assert_eq!(outcome.stats.pages_requested, 4);
    assert_eq!(outcome.stats.pages_fetched, 4);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_ranks_continue_across_pages() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[item("com.a", "A"), item("com.b", "B")]),
        1,
    )
    .await;
    mount_listing(&server, 24, listing_page(&[item("com.c", "C")]), 1).await;
    for id in ["com.a", "com.b", "com.c"] {
        mount_detail(&server, id, html(detail_page("1.0", "1 - 5"))).await;
    }

    let outcome = crawl(create_test_config(&server, 1)).await.unwrap();

    assert_eq!(outcome.records.ranks(), vec![1, 2, 3]);
    let ids: Vec<&str> = outcome
        .records
        .iter()
        .map(|r| r.item_id.as_str())
        .collect();
    assert_eq!(ids, vec!["com.a", "com.b", "com.c"]);
}

#[tokio::test]
async fn test_item_on_two_pages_is_recorded_twice() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&[item("com.dup", "Dup")]), 1).await;
    mount_listing(&server, 24, listing_page(&[item("com.dup", "Dup")]), 1).await;
    mount_detail(&server, "com.dup", html(detail_page("1.0", "1 - 5"))).await;

    let outcome = crawl(create_test_config(&server, 1)).await.unwrap();

    assert_eq!(outcome.records.ranks(), vec![1, 2]);
    assert!(outcome.records.iter().all(|r| r.item_id == "com.dup"));
}

#[tokio::test]
async fn test_failed_detail_is_skipped_without_rank_gap() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[
            item("com.one", "One"),
            item("com.two", "Two"),
            item("com.three", "Three"),
        ]),
        1,
    )
    .await;
    mount_detail(&server, "com.one", html(detail_page("1.0", "1 - 5"))).await;
    mount_detail(&server, "com.two", ResponseTemplate::new(500)).await;
    mount_detail(&server, "com.three", html(detail_page("3.0", "1 - 5"))).await;

    let outcome = crawl(create_test_config(&server, 0)).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.ranks(), vec![1, 2]);
    assert_eq!(outcome.records.records()[1].item_id, "com.three");

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].item_id.as_deref(), Some("com.two"));
    assert_eq!(outcome.skipped[0].position, 1);
    assert!(outcome.skipped[0].reason.contains("500"));
    assert_eq!(outcome.stats.items_skipped, 1);
}

#[tokio::test]
async fn test_discovery_rank_policy_keeps_rank_of_failed_item() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[
            item("com.one", "One"),
            item("com.two", "Two"),
            item("com.three", "Three"),
        ]),
        1,
    )
    .await;
    mount_detail(&server, "com.one", html(detail_page("1.0", "1 - 5"))).await;
    mount_detail(&server, "com.two", ResponseTemplate::new(404)).await;
    mount_detail(&server, "com.three", html(detail_page("3.0", "1 - 5"))).await;

    let mut config = create_test_config(&server, 0);
    config.crawl.rank_policy = RankPolicy::Discovery;
    let outcome = crawl(config).await.unwrap();

    assert_eq!(outcome.records.ranks(), vec![1, 3]);
}

#[tokio::test]
async fn test_detail_without_metadata_is_skipped() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[item("com.gone", "Gone"), item("com.ok", "Ok")]),
        1,
    )
    .await;
    mount_detail(
        &server,
        "com.gone",
        html("<html><body>We're sorry, the requested URL was not found.</body></html>".into()),
    )
    .await;
    mount_detail(&server, "com.ok", html(detail_page("1.0", "1 - 5"))).await;

    let outcome = crawl(create_test_config(&server, 0)).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records.records()[0].item_id, "com.ok");
    assert_eq!(outcome.records.records()[0].rank, 1);
    assert!(outcome.skipped[0].reason.contains("metadata"));
}

#[tokio::test]
async fn test_detail_timeout_is_skipped() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[item("com.slow", "Slow"), item("com.fast", "Fast")]),
        1,
    )
    .await;
    mount_detail(
        &server,
        "com.slow",
        html(detail_page("1.0", "1 - 5")).set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_detail(&server, "com.fast", html(detail_page("1.0", "1 - 5"))).await;

    let mut config = create_test_config(&server, 0);
    config.http.timeout_secs = 1;
    let outcome = crawl(config).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records.records()[0].item_id, "com.fast");
    assert!(outcome.skipped[0].reason.contains("timeout"));
}

#[tokio::test]
async fn test_ranks_follow_listing_order_not_completion_order() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        0,
        listing_page(&[
            item("com.slow", "Slow"),
            item("com.fast", "Fast"),
            item("com.mid", "Mid"),
        ]),
        1,
    )
    .await;
    mount_detail(
        &server,
        "com.slow",
        html(detail_page("1.0", "1 - 5")).set_delay(Duration::from_millis(800)),
    )
    .await;
    mount_detail(&server, "com.fast", html(detail_page("2.0", "1 - 5"))).await;
    mount_detail(
        &server,
        "com.mid",
        html(detail_page("3.0", "1 - 5")).set_delay(Duration::from_millis(200)),
    )
    .await;

    let mut config = create_test_config(&server, 0);
    config.crawl.detail_concurrency = 3;
    let outcome = crawl(config).await.unwrap();

    let ranked: Vec<(u32, &str)> = outcome
        .records
        .iter()
        .map(|r| (r.rank, r.item_id.as_str()))
        .collect();
    assert_eq!(
        ranked,
        vec![(1, "com.slow"), (2, "com.fast"), (3, "com.mid")]
    );
    assert_eq!(outcome.records.records()[0].version.as_deref(), Some("1.0"));
    assert!(outcome.skipped.is_empty());
}

#[tokio::test]
async fn test_snippet_without_title_is_skipped() {
    let server = MockServer::start().await;
    let body = format!(
        "{}{}",
        r#"<html><body><ul><li class="snippet"><div class="details"></div></li></ul>"#,
        listing_page(&[item("com.ok", "Ok")])
    );
    mount_listing(&server, 0, body, 1).await;
    mount_detail(&server, "com.ok", html(detail_page("1.0", "1 - 5"))).await;

    let outcome = crawl(create_test_config(&server, 0)).await.unwrap();

    assert_eq!(outcome.records.ranks(), vec![1]);
    assert_eq!(outcome.stats.items_discovered, 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].item_id, None);
}

#[tokio::test]
async fn test_stop_after_consecutive_empty_pages() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&[]), 1).await;
    mount_listing(&server, 24, listing_page(&[]), 1).await;
    mount_listing(&server, 48, listing_page(&[]), 0).await;

    let mut config = create_test_config(&server, 10);
    config.crawl.stop_after_empty_pages = 2;
    let outcome = crawl(config).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.stats.pages_requested, 2);
    assert_eq!(outcome.stats.empty_pages, 2);
}

#[tokio::test]
async fn test_failed_page_is_skipped_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 24, listing_page(&[item("com.late", "Late")]), 1).await;
    mount_detail(&server, "com.late", html(detail_page("1.0", "1 - 5"))).await;

    let outcome = crawl(create_test_config(&server, 1)).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.stats.pages_failed, 1);
    assert_eq!(outcome.records.ranks(), vec![1]);
    assert_eq!(outcome.records.records()[0].item_id, "com.late");
}

#[tokio::test]
async fn test_abort_keeps_partial_records() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&[item("com.early", "Early")]), 1).await;
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("start", "24"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 48, listing_page(&[]), 0).await;
    mount_detail(&server, "com.early", html(detail_page("1.0", "1 - 5"))).await;

    let mut config = create_test_config(&server, 2);
    config.crawl.on_page_error = PageErrorPolicy::Abort;
    let outcome = crawl(config).await.unwrap();

    assert!(!outcome.is_complete());
    assert!(matches!(
        outcome.aborted,
        Some(HarvestError::PageAborted { page: 1, .. })
    ));
    assert_eq!(outcome.records.ranks(), vec![1]);

    // Partial results remain reportable
    let mut sink = Vec::new();
    write_report(ReportFormat::Ranks, &outcome.records, &mut sink).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), "Early,1\n");
}

#[tokio::test]
async fn test_listing_page_retried_before_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_listing(&server, 0, listing_page(&[item("com.retry", "Retry")]), 1).await;
    mount_detail(&server, "com.retry", html(detail_page("1.0", "1 - 5"))).await;

    let mut config = create_test_config(&server, 0);
    config.http.page_retries = 2;
    let outcome = crawl(config).await.unwrap();

    assert_eq!(outcome.stats.pages_failed, 0);
    assert_eq!(outcome.records.ranks(), vec![1]);
}

#[tokio::test]
async fn test_paid_list_and_category_in_listing_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/details"))
        .and(query_param("id", "apps_topselling_paid"))
        .and(query_param("cat", "TOOLS"))
        .and(query_param("start", "0"))
        .and(query_param("num", "24"))
        .respond_with(html(listing_page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, 0);
    config.crawl.category = "TOOLS".to_string();
    config.crawl.purchase_type = "paid".parse().unwrap();

    let driver = PaginationDriver::new(config).expect("Failed to create driver");
    let outcome = driver.run().await;

    assert_eq!(outcome.stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_csv_report_from_crawl() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, listing_page(&[item("com.csv", "Csv Game")]), 1).await;
    mount_detail(&server, "com.csv", html(detail_page("4.0", "5,000 - 10,000"))).await;

    let outcome = crawl(create_test_config(&server, 0)).await.unwrap();

    let mut sink = Vec::new();
    write_report(ReportFormat::Csv, &outcome.records, &mut sink).unwrap();
    let text = String::from_utf8(sink).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("rank,title,developer,price,item_id"));
    assert!(lines[1].starts_with("1,Csv Game,Example Studio,$0.00,com.csv,"));
    assert!(lines[1].contains("\"5,000\",\"10,000\",3.1M"));
}
