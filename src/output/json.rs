//! `posts.json` and `summary.json`, the documents the static dashboard loads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{format_date, format_duration, ReportData};
use crate::aggregate::{entry_cve_ids, recent_cve_ids, CategoryStats, Entry, TrendingTopic};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    pub guid: &'a str,
    pub title: &'a str,
    /// The entry's link, or its id when the feed gave none.
    pub link: &'a str,
    pub description: &'a str,
    /// RFC 3339, or `null` when the publish time could not be read.
    pub published_time: Option<String>,
    pub author: &'a str,
    pub categories: &'a [String],
    pub source_category: &'a str,
    pub priority: u32,
    /// 0 when the publish time is unknown.
    pub age_hours: f64,
    pub is_new: bool,
    pub is_today: bool,
    pub is_this_week: bool,
    pub cve_ids: Vec<String>,
}

impl<'a> PostRecord<'a> {
    pub fn new(entry: &'a Entry, source_category: &'a str, now: DateTime<Utc>) -> Self {
        let age_hours = entry
            .published_at
            .map(|at| (now - at).num_seconds() as f64 / 3600.0)
            .unwrap_or(0.0);

        Self {
            guid: &entry.id,
            title: &entry.title,
            link: entry.link.as_deref().unwrap_or(&entry.id),
            description: &entry.description,
            published_time: entry
                .published_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            author: &entry.author,
            categories: &entry.tags,
            source_category,
            priority: entry.effective_priority,
            age_hours,
            is_new: entry.is_new,
            is_today: entry.is_today,
            is_this_week: entry.is_this_week,
            cve_ids: entry_cve_ids(entry),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_feeds: usize,
    pub successful_feeds: usize,
    pub failed_feeds: usize,
    pub success_rate: f64,
    pub rate_limited: usize,
    pub processing_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary<'a> {
    pub total_posts: usize,
    pub new_posts: usize,
    pub today_posts: usize,
    pub this_week_posts: usize,
    pub categories: &'a [CategoryStats],
    pub trending_topics: &'a [TrendingTopic],
    #[serde(rename = "recentCVEs")]
    pub recent_cves: Vec<String>,
    pub stats: RunSummary,
    pub last_updated: String,
}

pub fn render_posts(data: &ReportData<'_>) -> serde_json::Result<String> {
    let posts: Vec<PostRecord<'_>> = data
        .entries
        .iter()
        .map(|e| PostRecord::new(e, data.index.category_of(&e.source_names), data.now))
        .collect();
    serde_json::to_string_pretty(&posts)
}

pub fn render_summary(data: &ReportData<'_>) -> serde_json::Result<String> {
    let stats = data.stats;
    let summary = Summary {
        total_posts: stats.total_entries,
        new_posts: stats.new_entries,
        today_posts: stats.today_entries,
        this_week_posts: stats.week_entries,
        categories: &data.categories,
        trending_topics: &data.trending,
        recent_cves: recent_cve_ids(data.entries),
        stats: RunSummary {
            total_feeds: stats.total_feeds,
            successful_feeds: stats.successful_feeds,
            failed_feeds: stats.failed_feeds,
            success_rate: stats.success_rate(),
            rate_limited: stats.rate_limited,
            processing_time: format_duration(stats.processing_time),
        },
        last_updated: format_date(data.now),
    };
    serde_json::to_string_pretty(&summary)
}
