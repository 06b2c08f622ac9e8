//! Entry merging: folds items from every source into one entry per item id.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::collections::HashMap;

use crate::catalog::SourceRecord;
use crate::feed::RawItem;

/// Naive layouts tried after RFC 2822 and RFC 3339; read as UTC.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// RFC 1123 body retried with an unrecognized zone abbreviation stripped.
const ZONELESS_LAYOUT: &str = "%d %b %Y %H:%M:%S";

/// Run-wide inputs to classification, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Previously published report. An id appearing anywhere in it is not new.
    pub ledger: String,
    /// Reference "now" for the today / this-week flags.
    pub now: DateTime<Utc>,
}

impl RunContext {
    pub fn new(ledger: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            ledger: ledger.into(),
            now,
        }
    }

    fn seen_before(&self, id: &str) -> bool {
        self.ledger.contains(id)
    }

    fn is_today(&self, published: DateTime<Utc>) -> bool {
        published.date_naive() == self.now.date_naive()
    }

    fn is_this_week(&self, published: DateTime<Utc>) -> bool {
        published > self.now - Duration::days(7)
    }
}

/// One unique post, merged across every source that reported it.
///
/// Content fields and the new/today/week flags come from the first sighting
/// and are never overwritten. Only the source lists and the priority change
/// on later sightings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub author: String,
    pub published_raw: String,
    /// `None` when `published_raw` matched no known layout.
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub source_urls: Vec<String>,
    pub source_names: Vec<String>,
    /// Lowest (most important) priority among all reporting sources.
    pub effective_priority: u32,
    pub is_new: bool,
    pub is_today: bool,
    pub is_this_week: bool,
}

impl Entry {
    fn first_sighting(item: RawItem, source: &SourceRecord, ctx: &RunContext) -> Self {
        let published_at = parse_published(&item.published_raw);
        if published_at.is_none() && !item.published_raw.is_empty() {
            tracing::debug!(id = %item.id, raw = %item.published_raw, "Unparsable publish date");
        }

        Self {
            is_new: !ctx.seen_before(&item.id),
            is_today: published_at.is_some_and(|p| ctx.is_today(p)),
            is_this_week: published_at.is_some_and(|p| ctx.is_this_week(p)),
            id: item.id,
            title: item.title,
            link: item.link,
            description: item.description,
            author: item.author,
            published_raw: item.published_raw,
            published_at,
            tags: item.tags,
            source_urls: vec![source.url.clone()],
            source_names: vec![source.name.clone()],
            effective_priority: source.priority,
        }
    }

    fn add_sighting(&mut self, source: &SourceRecord) {
        if !self.source_urls.iter().any(|url| url == &source.url) {
            self.source_urls.push(source.url.clone());
            self.source_names.push(source.name.clone());
        }
        self.effective_priority = self.effective_priority.min(source.priority);
    }
}

/// Run-scoped accumulator: one [`Entry`] per distinct id, in first-sighting order.
#[derive(Debug, Default, Clone)]
pub struct EntrySet {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one source's items into the set and returns how many were processed.
    ///
    /// Unknown ids create a new entry. Known ids gain the source (once) and
    /// may lower their effective priority; nothing else about them changes.
    pub fn merge(&mut self, items: Vec<RawItem>, source: &SourceRecord, ctx: &RunContext) -> usize {
        let mut processed = 0;

        for item in items {
            match self.index.get(&item.id) {
                Some(&idx) => self.entries[idx].add_sighting(source),
                None => {
                    let entry = Entry::first_sighting(item, source, ctx);
                    self.index.insert(entry.id.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
            processed += 1;
        }

        processed
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-sighting order.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

/// Probes the known timestamp layouts in a fixed order; the first match wins.
///
/// Never fails loudly: anything unrecognized is `None`.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // The weekday is informational only; feeds often get it wrong
    let body = without_weekday(raw);
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw).or_else(|_| DateTime::parse_from_rfc2822(body)) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Some(naive.and_utc());
    }

    // "Mon, 02 Jan 2006 15:04:05 MST" with a zone chrono does not know
    let (rest, zone) = body.rsplit_once(' ')?;
    if !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    NaiveDateTime::parse_from_str(rest, ZONELESS_LAYOUT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drops a leading "Tue, " (or "Tuesday, ") so the date is read on its own.
fn without_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => raw,
    }
}
