use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter};

use secfeed::aggregate::{rank, AggregatorStats, RunContext};
use secfeed::catalog::{default_catalog, CategoryIndex};
use secfeed::config::{is_debug_value, Config, DEFAULT_CONFIG_FILE};
use secfeed::feed::{Aggregator, FetchProgress, HttpFetcher};
use secfeed::output::{Artifacts, ReportData};

#[derive(Parser, Debug)]
#[command(
    name = "secfeed",
    version,
    about = "Aggregates security RSS feeds into a ranked Markdown and JSON digest"
)]
struct Args {
    /// Config file (TOML). Missing file means defaults.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Only fetch the first N catalog sources (0 = all)
    #[arg(long, value_name = "N")]
    max_feeds: Option<usize>,

    /// Base pause between sources, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<u64>,

    /// Directory for posts.json and summary.json
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Where to write the Markdown report
    #[arg(long, value_name = "FILE")]
    readme: Option<PathBuf>,

    /// Previous report to check for already-seen posts (defaults to the report path)
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(n) = self.max_feeds {
            config.max_feeds = n;
        }
        if let Some(secs) = self.delay {
            config.request_delay_secs = secs;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = &self.readme {
            config.readme_path = path.clone();
        }
        if let Some(path) = &self.ledger {
            config.ledger_path = Some(path.clone());
        }
        if self.debug {
            config.debug = true;
        }
    }
}

/// `RUST_LOG` wins; otherwise info, or debug in debug mode.
fn log_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }))
}

/// Text of the previous report. A missing file means nothing has been seen.
fn read_ledger(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No previous report, every post counts as new");
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read ledger '{}'", path.display())),
    }
}

fn print_progress(event: &FetchProgress) {
    match event {
        FetchProgress::Fetched { done, total, source, items } => {
            println!("[{done}/{total}] ✅ {source}: {items} posts");
        }
        FetchProgress::RateLimited { done, total, source, pause } => {
            println!(
                "[{done}/{total}] ⏳ {source}: rate limited, pausing {}s",
                pause.as_secs()
            );
        }
        FetchProgress::Failed { done, total, source, error } => {
            println!("[{done}/{total}] ❌ {source}: {error}");
        }
    }
}

fn print_summary(stats: &AggregatorStats) {
    println!();
    println!("📊 PROCESSING SUMMARY");
    println!("🕒 Processing Time: {}s", stats.processing_time.as_secs());
    println!(
        "📡 Feeds Processed: {}/{} ({:.1}% success rate)",
        stats.successful_feeds,
        stats.total_feeds,
        stats.success_rate()
    );
    if stats.rate_limited > 0 {
        println!("⏳ Rate Limited: {} feeds", stats.rate_limited);
    }
    println!("📄 Total Entries: {}", stats.total_entries);
    println!(
        "🆕 New Entries: {} ({:.1}%)",
        stats.new_entries,
        stats.entry_share(stats.new_entries)
    );
    println!(
        "📅 Today's Entries: {} ({:.1}%)",
        stats.today_entries,
        stats.entry_share(stats.today_entries)
    );
    println!(
        "📈 This Week's Entries: {} ({:.1}%)",
        stats.week_entries,
        stats.entry_share(stats.week_entries)
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Level can still be raised once the config file has been read
    let early_debug = args.debug || std::env::var("DEBUG_MODE").is_ok_and(|v| is_debug_value(&v));
    let (filter, filter_handle) = reload::Layer::new(log_filter(early_debug));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    config.apply_env();
    args.apply(&mut config);

    if config.debug && !early_debug {
        if let Err(e) = filter_handle.reload(log_filter(true)) {
            tracing::warn!(error = %e, "Failed to raise log level");
        }
    }
    tracing::debug!(config = ?config, "Effective configuration");

    let started = Instant::now();
    let now = Utc::now();

    let ledger = read_ledger(config.ledger_path())?;
    let ctx = RunContext::new(ledger, now);

    let mut catalog = default_catalog();
    if config.max_feeds > 0 && config.max_feeds < catalog.len() {
        tracing::info!(max_feeds = config.max_feeds, "Limiting catalog");
        catalog.truncate(config.max_feeds);
    }
    let index = CategoryIndex::new(&catalog);

    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())
        .context("Failed to build HTTP client")?;

    println!("🛡️  Fetching {} feeds...", catalog.len());

    let (progress_tx, mut progress_rx) = mpsc::channel::<FetchProgress>(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            print_progress(&event);
        }
    });

    let aggregator = Aggregator::new(fetcher, config.request_delay()).with_progress(progress_tx);
    let state = aggregator.run(&catalog, &ctx).await;

    // Closing the channel lets the printer drain and finish
    drop(aggregator);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Progress printer task failed");
    }

    if state.entries.is_empty() {
        eprintln!("❌ No entries were retrieved from any feed; nothing was written");
        std::process::exit(1);
    }

    let ranked = rank(state.entries);
    let mut stats = state.stats;
    stats.finalize(&ranked, started.elapsed());

    let data = ReportData::new(&ranked, &stats, &index, catalog.len(), now);
    let artifacts = Artifacts::render(&data)?;
    artifacts.write(&config.readme_path, &config.output_dir)?;

    print_summary(&stats);
    println!(
        "\n✅ Wrote {} and {}",
        config.readme_path.display(),
        config.output_dir.display()
    );

    Ok(())
}
