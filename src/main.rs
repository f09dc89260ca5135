//! # Article Harvester
//!
//! Collects the latest articles from a few security and business news sites
//! and keeps them in a local JSON store for later display.
//!
//! ## Features
//!
//! - Harvests BleepingComputer, Morning Brew and IT Brew
//! - Resolves author and publish date from inconsistent markup through
//!   ordered fallbacks (CSS selectors, `<meta>` tags, JSON-LD)
//! - Idempotent: an article is stored once, keyed by its title
//! - Renders the stored articles as Markdown or JSON
//!
//! ## Usage
//!
//! ```sh
//! article_harvester fetch --source all
//! article_harvester auto-fetch --interval 1h
//! article_harvester refresh --confirm
//! article_harvester show --format markdown
//! ```
//!
//! ## Architecture
//!
//! Each harvest run is sequential:
//! 1. **Listing**: fetch the source's listing page
//! 2. **Classifying**: pick up to five article links off it
//! 3. **Extracting**: fetch each article and resolve author and date
//! 4. **Storing**: insert whatever is not already stored

use chrono::Utc;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classify;
mod cli;
mod config;
mod dates;
mod error;
mod extract;
mod models;
mod outputs;
mod scrapers;
mod store;
mod utils;

use cli::{Cli, Command, OutputFormat};
use config::HarvestConfig;
use error::{FetchError, StoreError};
use models::{Source, SourceSelection};
use outputs::{Listing, json, markdown, write_output};
use scrapers::fetch::HttpFetcher;
use scrapers::harvest::{HarvestReport, harvest, refresh};
use store::{AnyStore, JsonFileStore, MemoryStore, json_file::load_table};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args.store, ?args.config, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = HarvestConfig::resolve(args.store.clone(), args.config.as_deref())?;
    info!(store = %config.store_path.display(), dry_run = args.dry_run, "article_harvester starting up");

    match args.command {
        Command::Fetch { source } => run_fetch(&config, args.dry_run, source.into()).await,
        Command::AutoFetch { interval } => {
            run_auto_fetch(&config, args.dry_run, interval.map(Duration::from)).await
        }
        Command::Refresh { confirm } => run_refresh(&config, args.dry_run, confirm).await,
        Command::Show { format, output } => {
            run_show(&config, args.dry_run, format, output.as_deref()).await
        }
        Command::Sources => {
            println!("{}", describe_sources());
            Ok(())
        }
    }
}

/// Open the configured store, or an in-memory copy of it for `--dry-run`.
async fn open_store(config: &HarvestConfig, dry_run: bool) -> Result<AnyStore, StoreError> {
    if dry_run {
        let table = load_table(&config.store_path).await?;
        info!(articles = table.articles.len(), "Dry run: using an in-memory copy of the store");
        return Ok(AnyStore::Memory(MemoryStore::from_table(table)));
    }
    let store = JsonFileStore::open(&config.store_path).await?;
    debug!(path = %store.path().display(), "Store ready");
    Ok(AnyStore::File(store))
}

fn build_fetcher(config: &HarvestConfig) -> Result<HttpFetcher, FetchError> {
    HttpFetcher::new(&config.user_agent, config.timeout)
}

#[instrument(level = "info", skip(config))]
async fn run_fetch(
    config: &HarvestConfig,
    dry_run: bool,
    selection: SourceSelection,
) -> Result<(), Box<dyn Error>> {
    let fetcher = build_fetcher(config)?;
    let mut store = open_store(config, dry_run).await?;

    let reports = harvest(&fetcher, &mut store, selection).await;
    for report in &reports {
        println!("{report}");
    }
    Ok(())
}

/// Scheduled entry point: always all sources.
///
/// Anything that stops a cycle from running is logged and returned, so a
/// scheduler sees a non-zero exit. With an `interval` the cycle repeats
/// until one fails.
#[instrument(level = "info", skip(config))]
async fn run_auto_fetch(
    config: &HarvestConfig,
    dry_run: bool,
    interval: Option<Duration>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let started = Instant::now();
        info!(started_at = %Utc::now().to_rfc3339(), "Scheduled harvest starting");

        match scheduled_cycle(config, dry_run).await {
            Ok(reports) => {
                let saved: usize = reports.iter().map(|r| r.saved).sum();
                let unavailable = reports.iter().filter(|r| r.listing_error.is_some()).count();
                info!(
                    finished_at = %Utc::now().to_rfc3339(),
                    elapsed = %humantime::format_duration(round_to_millis(started.elapsed())),
                    saved,
                    unavailable,
                    "Scheduled harvest complete"
                );
            }
            Err(e) => {
                error!(error = %e, "Scheduled harvest failed");
                return Err(e);
            }
        }

        let Some(interval) = interval else {
            return Ok(());
        };
        info!(next_in = %humantime::format_duration(interval), "Sleeping until next harvest");
        tokio::time::sleep(interval).await;
    }
}

async fn scheduled_cycle(
    config: &HarvestConfig,
    dry_run: bool,
) -> Result<Vec<HarvestReport>, Box<dyn Error>> {
    let fetcher = build_fetcher(config)?;
    let mut store = open_store(config, dry_run).await?;
    Ok(harvest(&fetcher, &mut store, SourceSelection::All).await)
}

#[instrument(level = "info", skip(config))]
async fn run_refresh(config: &HarvestConfig, dry_run: bool, confirm: bool) -> Result<(), Box<dyn Error>> {
    if !confirm {
        warn!("Refresh requested without --confirm; nothing changed");
        println!("This will delete ALL stored articles and harvest again. Re-run with --confirm to proceed.");
        return Ok(());
    }

    let fetcher = build_fetcher(config)?;
    let mut store = open_store(config, dry_run).await?;

    let summary = refresh(&fetcher, &mut store).await?;
    println!("Deleted {} existing articles", summary.deleted);
    for report in &summary.reports {
        println!("{report}");
    }
    println!("Total articles in store: {}", summary.total);
    for (source, count) in &summary.per_source {
        println!("  {source}: {count}");
    }
    Ok(())
}

#[instrument(level = "info", skip(config, output))]
async fn run_show(
    config: &HarvestConfig,
    dry_run: bool,
    format: OutputFormat,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(config, dry_run).await?;
    let listing = Listing::collect(&store).await?;
    debug!(total = listing.total, "Collected listing");

    let rendered = match format {
        OutputFormat::Markdown => markdown::render(&listing),
        OutputFormat::Json => json::render(&listing)?,
    };
    write_output(&rendered, output).await
}

fn describe_sources() -> String {
    Source::ALL
        .iter()
        .map(|source| {
            format!(
                "{:<18}{:<18}{}",
                source.cli_name(),
                source.display_name(),
                scrapers::profile(*source).listing_url
            )
        })
        .join("\n")
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
