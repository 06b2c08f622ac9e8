use chrono::{DateTime, Utc};
use std::time::Duration;

use super::entry::Entry;
use crate::feed::FetchError;

/// Run-level counters.
///
/// Source counters move during the fetch loop; entry counters and the
/// processing time are filled in once by [`AggregatorStats::finalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatorStats {
    pub total_feeds: usize,
    pub successful_feeds: usize,
    /// Every unsuccessful source, rate limited ones included.
    pub failed_feeds: usize,
    pub rate_limited: usize,
    pub total_entries: usize,
    pub new_entries: usize,
    pub today_entries: usize,
    pub week_entries: usize,
    pub processing_time: Duration,
    pub started_at: DateTime<Utc>,
}

impl AggregatorStats {
    pub fn new(total_feeds: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            total_feeds,
            started_at,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.successful_feeds += 1;
    }

    pub fn record_failure(&mut self, error: &FetchError) {
        self.failed_feeds += 1;
        if error.is_rate_limited() {
            self.rate_limited += 1;
        }
    }

    /// Sets the entry counters from the final ranked set.
    pub fn finalize(&mut self, entries: &[Entry], elapsed: Duration) {
        self.total_entries = entries.len();
        self.new_entries = entries.iter().filter(|e| e.is_new).count();
        self.today_entries = entries.iter().filter(|e| e.is_today).count();
        self.week_entries = entries.iter().filter(|e| e.is_this_week).count();
        self.processing_time = elapsed;
    }

    /// Successful sources as a percentage of all sources (0 when there are none).
    pub fn success_rate(&self) -> f64 {
        percent(self.successful_feeds, self.total_feeds)
    }

    /// `count` as a percentage of all entries (0 when there are none).
    pub fn entry_share(&self, count: usize) -> f64 {
        percent(count, self.total_entries)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
