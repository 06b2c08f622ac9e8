//! The core of a run: merging items into entries, ranking them, and the
//! statistics and reports derived from the ranked set.
//!
//! - [`entry`] - one [`Entry`] per item id across all sources
//! - [`rank`] - deterministic presentation order
//! - [`report`] - category rollups, trending tags, CVE identifiers
//! - [`stats`] - run-level counters

pub mod entry;
pub mod rank;
pub mod report;
pub mod stats;

pub use entry::{parse_published, Entry, EntrySet, RunContext};
pub use rank::rank;
pub use report::{
    category_stats, entry_cve_ids, extract_cve_ids, recent_cve_ids, trending_topics,
    CategoryStats, TrendingTopic,
};
pub use stats::AggregatorStats;
