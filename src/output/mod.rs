//! Presentation layer: the Markdown digest and the JSON documents.
//!
//! Everything is rendered in memory first; only a fully rendered set of
//! [`Artifacts`] is written, one atomic replace per file.

pub mod json;
pub mod markdown;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::aggregate::{category_stats, trending_topics, AggregatorStats, CategoryStats, Entry, TrendingTopic};
use crate::catalog::CategoryIndex;

pub const APP_NAME: &str = "Medium Cybersecurity RSS Aggregator";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const POSTS_FILE: &str = "posts.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Inputs shared by every renderer.
pub struct ReportData<'a> {
    /// Ranked entries.
    pub entries: &'a [Entry],
    /// Finalized run statistics.
    pub stats: &'a AggregatorStats,
    pub index: &'a CategoryIndex,
    pub categories: Vec<CategoryStats>,
    pub trending: Vec<TrendingTopic>,
    /// Number of catalog sources considered for the run.
    pub source_count: usize,
    pub now: DateTime<Utc>,
}

impl<'a> ReportData<'a> {
    pub fn new(
        entries: &'a [Entry],
        stats: &'a AggregatorStats,
        index: &'a CategoryIndex,
        source_count: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            entries,
            stats,
            index,
            categories: category_stats(entries, index),
            trending: trending_topics(entries),
            source_count,
            now,
        }
    }
}

/// Fully rendered output of a run.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub readme: String,
    pub posts_json: String,
    pub summary_json: String,
}

impl Artifacts {
    pub fn render(data: &ReportData<'_>) -> Result<Self> {
        Ok(Self {
            readme: markdown::render(data).context("Failed to render Markdown report")?,
            posts_json: json::render_posts(data).context("Failed to serialize posts")?,
            summary_json: json::render_summary(data).context("Failed to serialize summary")?,
        })
    }

    /// Writes the report to `readme_path` and the JSON documents into
    /// `output_dir`, creating the directory if needed.
    pub fn write(&self, readme_path: &Path, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory '{}'", output_dir.display())
        })?;

        atomic_write(&output_dir.join(POSTS_FILE), self.posts_json.as_bytes())?;
        atomic_write(&output_dir.join(SUMMARY_FILE), self.summary_json.as_bytes())?;
        atomic_write(readme_path, self.readme.as_bytes())?;

        tracing::info!(
            readme = %readme_path.display(),
            output_dir = %output_dir.display(),
            "Wrote artifacts"
        );
        Ok(())
    }
}

/// Replaces `dst` with `content` using write-to-temp-then-rename, so `dst` is
/// never left partially written.
pub fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    // Unpredictable temp name; create_new refuses to follow a planted file
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    temp_file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write to temporary file '{}': disk may be full",
            temp_path.display()
        )
    })?;

    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk: disk may be full",
            temp_path.display()
        )
    })?;

    drop(temp_file);

    // On Windows, rename fails if destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!("Failed to remove existing '{}' before atomic replace", dst.display())
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

/// `Wed, 08 Jan 2025`
pub(crate) fn format_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y").to_string()
}

/// Whole-second duration in the compact `1h2m3s` form.
pub(crate) fn format_duration(d: Duration) -> String {
    let secs = (d.as_millis() + 500) / 1000;
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m{s}s"),
        _ => format!("{h}h{m}m{s}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{rank, EntrySet, RunContext};
    use crate::catalog::SourceRecord;
    use crate::feed::RawItem;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("secfeed_output_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(44_600)), "45s");
        assert_eq!(format_duration(Duration::from_secs(83)), "1m23s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h2m3s");
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 23, 59, 0).unwrap();
        assert_eq!(format_date(at), "Wed, 08 Jan 2025");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = temp_dir("atomic");
        let path = dir.join("README.md");
        std::fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new content").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_atomic_write_missing_directory_fails() {
        let dir = temp_dir("atomic_missing");
        let path = dir.join("nope").join("README.md");
        assert!(atomic_write(&path, b"x").is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_render_and_write_artifacts() {
        let now = Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap();
        let source = SourceRecord::new("https://medium.com/feed/tag/osint", "Tools & OSINT", 7, "#74B9FF");
        let index = CategoryIndex::new(std::slice::from_ref(&source));
        let ctx = RunContext::new("", now);

        let mut set = EntrySet::new();
        set.merge(
            vec![RawItem {
                id: "https://medium.com/p/one".into(),
                title: "Recon | tips".into(),
                published_raw: "Wed, 08 Jan 2025 10:00:00 GMT".into(),
                tags: vec!["OSINT".into()],
                ..RawItem::default()
            }],
            &source,
            &ctx,
        );
        let ranked = rank(set);
        let mut stats = AggregatorStats::new(1, now);
        stats.record_success();
        stats.finalize(&ranked, Duration::from_secs(5));

        let data = ReportData::new(&ranked, &stats, &index, 1, now);
        let artifacts = Artifacts::render(&data).unwrap();

        assert!(artifacts.readme.contains("(https://medium.com/p/one)"));
        assert!(artifacts.readme.contains(r"Recon \| tips"));
        assert!(artifacts.readme.contains("| **Tools & OSINT** | 1 | 1 | 1 | 📈 |"));
        assert!(artifacts.readme.contains("- **osint** (1 posts)"));
        assert!(artifacts.readme.contains("- **Last Updated**: Wed, 08 Jan 2025 GMT"));

        let summary: serde_json::Value = serde_json::from_str(&artifacts.summary_json).unwrap();
        assert_eq!(summary["totalPosts"], 1);
        assert_eq!(summary["stats"]["successRate"], 100.0);
        assert_eq!(summary["stats"]["processingTime"], "5s");

        let dir = temp_dir("artifacts");
        let readme = dir.join("README.md");
        let out = dir.join("data");
        artifacts.write(&readme, &out).unwrap();

        assert_eq!(std::fs::read_to_string(&readme).unwrap(), artifacts.readme);
        assert_eq!(
            std::fs::read_to_string(out.join(POSTS_FILE)).unwrap(),
            artifacts.posts_json
        );
        assert!(out.join(SUMMARY_FILE).exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
