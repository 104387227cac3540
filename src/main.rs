//! Market-Harvest main entry point
//!
//! This is the command-line interface for the Market-Harvest listing harvester.

use anyhow::{bail, Context};
use clap::Parser;
use market_harvest::config::{parse_config, validate, Config, PurchaseType};
use market_harvest::crawler::crawl;
use market_harvest::output::{print_statistics, write_report, ReportFormat};
use market_harvest::url::listing_url;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Market-Harvest: a ranked marketplace listing harvester
///
/// Walks the top-selling pages of one marketplace category, visits every
/// listed item's detail page, and writes the ranked records as a report.
#[derive(Parser, Debug)]
#[command(name = "market-harvest")]
#[command(version)]
#[command(about = "A ranked marketplace listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Last listing page index to fetch (inclusive)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Marketplace category code, e.g. GAME
    #[arg(long)]
    category: Option<String>,

    /// Which top-selling list to walk: free or paid
    #[arg(long, value_name = "TYPE")]
    purchase_type: Option<PurchaseType>,

    /// Base URL shared by listing and detail pages
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Skip TLS certificate validation
    #[arg(long)]
    insecure: bool,

    /// Report layout: csv (all fields) or ranks (title,rank lines)
    #[arg(short, long, default_value = "csv")]
    format: ReportFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved configuration and the listing URLs without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, cli.format, cli.output, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("market_harvest=info,warn"),
            1 => EnvFilter::new("market_harvest=debug,info"),
            2 => EnvFilter::new("market_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and validates
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(category) = &cli.category {
        config.crawl.category = category.clone();
    }
    if let Some(purchase_type) = cli.purchase_type {
        config.crawl.purchase_type = purchase_type;
    }
    if let Some(base_url) = &cli.base_url {
        config.endpoints.base_url = base_url.clone();
    }
    if cli.insecure {
        config.http.accept_invalid_certs = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the configuration and the planned requests
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Market-Harvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Category: {}", config.crawl.category);
    println!("  Purchase type: {}", config.crawl.purchase_type);
    println!("  Max page index: {}", config.crawl.max_pages);
    println!("  Detail concurrency: {}", config.crawl.detail_concurrency);
    println!("  Rank policy: {:?}", config.crawl.rank_policy);
    println!("  On page error: {:?}", config.crawl.on_page_error);
    if config.crawl.stop_after_empty_pages > 0 {
        println!(
            "  Stop after {} empty pages",
            config.crawl.stop_after_empty_pages
        );
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Page retries: {}", config.http.page_retries);
    println!(
        "  Certificate validation: {}",
        if config.http.accept_invalid_certs {
            "disabled"
        } else {
            "enabled"
        }
    );

    println!("\nListing pages:");
    for page in 0..=config.crawl.max_pages {
        let url = listing_url(
            &config.endpoints.base_url,
            config.crawl.purchase_type,
            &config.crawl.category,
            page,
        )?;
        println!("  {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation and writes the report
async fn handle_crawl(
    config: Config,
    format: ReportFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> anyhow::Result<()> {
    let outcome = crawl(config).await.context("Failed to start crawl")?;

    // The report is written even after an abort so collected records survive
    match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_report(format, &outcome.records, BufWriter::new(file))
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            write_report(format, &outcome.records, io::stdout().lock())
                .context("Failed to write report to stdout")?;
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::warn!("{} items were skipped", outcome.skipped.len());
        for item in &outcome.skipped {
            tracing::debug!(
                "  page {} position {} ({}): {}",
                item.page,
                item.position,
                item.item_id.as_deref().unwrap_or("-"),
                item.reason
            );
        }
    }

    if !quiet {
        print_statistics(&outcome.stats);
    }

    if let Some(error) = outcome.aborted {
        tracing::error!("Crawl failed: {}", error);
        bail!(
            "crawl aborted after {} records: {}",
            outcome.records.len(),
            error
        );
    }

    tracing::info!(
        "Crawl completed successfully ({} to {})",
        outcome.started_at.to_rfc3339(),
        outcome.finished_at.to_rfc3339()
    );
    Ok(())
}
