use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::aggregate::{AggregatorStats, EntrySet, RunContext};
use crate::catalog::SourceRecord;
use crate::feed::fetcher::{FeedFetcher, FetchError};

/// Pause between sources when nothing has been rate limited yet.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(3);

/// Per-source progress, emitted after each fetch completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    Fetched {
        done: usize,
        total: usize,
        source: String,
        items: usize,
    },
    RateLimited {
        done: usize,
        total: usize,
        source: String,
        pause: Duration,
    },
    Failed {
        done: usize,
        total: usize,
        source: String,
        error: String,
    },
}

/// Everything a completed run produced: merged entries plus source counters.
///
/// Entry counters in `stats` are still zero; they are filled in once the set
/// has been ranked.
#[derive(Debug)]
pub struct RunState {
    pub entries: EntrySet,
    pub stats: AggregatorStats,
}

/// Sequential fetch loop over the active sources of a catalog.
///
/// One request is in flight at a time. Pacing:
/// - after a success, wait the base delay (doubled for the rest of the run
///   once any source has been rate limited)
/// - after a 429, wait twice the base delay
/// - after any other failure, move on immediately
/// - never wait after the last active source
pub struct Aggregator<F> {
    fetcher: F,
    delay: Duration,
    progress_tx: Option<mpsc::Sender<FetchProgress>>,
}

impl<F: FeedFetcher> Aggregator<F> {
    pub fn new(fetcher: F, delay: Duration) -> Self {
        Self {
            fetcher,
            delay,
            progress_tx: None,
        }
    }

    /// Reports per-source outcomes on `tx` as the run progresses.
    pub fn with_progress(mut self, tx: mpsc::Sender<FetchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Fetches every active source in catalog order and merges the results.
    ///
    /// No single source failure aborts the run.
    pub async fn run(&self, sources: &[SourceRecord], ctx: &RunContext) -> RunState {
        let active: Vec<&SourceRecord> = sources.iter().filter(|s| s.active).collect();
        let total = active.len();

        let skipped = sources.len() - total;
        if skipped > 0 {
            tracing::debug!(skipped = skipped, "Skipping inactive sources");
        }

        let mut entries = EntrySet::new();
        let mut stats = AggregatorStats::new(total, Utc::now());
        let mut throttled = false;

        for (idx, source) in active.iter().enumerate() {
            let done = idx + 1;
            let is_last = done == total;

            tracing::debug!(source = %source.name, url = %source.url, done = done, total = total, "Fetching");

            let pause = match self.fetcher.fetch(&source.url).await {
                Ok(feed) => {
                    stats.record_success();
                    let items = entries.merge(feed.items, source, ctx);
                    tracing::debug!(source = %source.name, items = items, "Fetched source");
                    self.report(FetchProgress::Fetched {
                        done,
                        total,
                        source: source.name.clone(),
                        items,
                    })
                    .await;

                    if throttled {
                        self.delay.saturating_mul(2)
                    } else {
                        self.delay
                    }
                }
                Err(FetchError::RateLimited) => {
                    stats.record_failure(&FetchError::RateLimited);
                    throttled = true;
                    let pause = self.delay.saturating_mul(2);
                    tracing::warn!(
                        source = %source.name,
                        pause_secs = pause.as_secs_f64(),
                        "Rate limited, slowing down for the rest of the run"
                    );
                    self.report(FetchProgress::RateLimited {
                        done,
                        total,
                        source: source.name.clone(),
                        pause,
                    })
                    .await;
                    pause
                }
                Err(e) => {
                    stats.record_failure(&e);
                    tracing::warn!(source = %source.name, url = %source.url, error = %e, "Failed to fetch source");
                    self.report(FetchProgress::Failed {
                        done,
                        total,
                        source: source.name.clone(),
                        error: e.to_string(),
                    })
                    .await;
                    Duration::ZERO
                }
            };

            if !is_last && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        tracing::info!(
            sources = total,
            successful = stats.successful_feeds,
            failed = stats.failed_feeds,
            rate_limited = stats.rate_limited,
            entries = entries.len(),
            "Fetch loop complete"
        );

        RunState { entries, stats }
    }

    async fn report(&self, event: FetchProgress) {
        if let Some(tx) = &self.progress_tx {
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "Progress channel send failed (receiver dropped)");
            }
        }
    }
}
