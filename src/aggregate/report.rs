//! Pure reports over the ranked entry set.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::entry::Entry;
use crate::catalog::CategoryIndex;

const CVE_PREFIX: &str = "CVE-";
const CVE_MIN_LEN: usize = 9;

/// Per-category rollup, keyed by the category of an entry's first known source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub name: String,
    pub total_posts: usize,
    pub new_posts: usize,
    pub today_posts: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingTopic {
    pub name: String,
    pub count: usize,
}

/// Groups entries by category and counts total/new/today per group.
///
/// Ordered by total descending; equal totals keep first-appearance order.
pub fn category_stats(entries: &[Entry], index: &CategoryIndex) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let (category, color) = index.lookup(&entry.source_names);
        let slot = *slots.entry(category).or_insert_with(|| {
            stats.push(CategoryStats {
                name: category.to_string(),
                total_posts: 0,
                new_posts: 0,
                today_posts: 0,
                color: color.to_string(),
            });
            stats.len() - 1
        });

        let cat = &mut stats[slot];
        cat.total_posts += 1;
        cat.new_posts += usize::from(entry.is_new);
        cat.today_posts += usize::from(entry.is_today);
    }

    stats.sort_by(|a, b| b.total_posts.cmp(&a.total_posts));
    stats
}

/// Counts lower-cased tags across all entries, most frequent first.
///
/// Equal counts keep first-appearance order. Blank tags are ignored.
pub fn trending_topics(entries: &[Entry]) -> Vec<TrendingTopic> {
    let mut topics: Vec<TrendingTopic> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for tag in entries.iter().flat_map(|e| e.tags.iter()) {
        let key = tag.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match slots.get(&key) {
            Some(&slot) => topics[slot].count += 1,
            None => {
                slots.insert(key.clone(), topics.len());
                topics.push(TrendingTopic { name: key, count: 1 });
            }
        }
    }

    topics.sort_by(|a, b| b.count.cmp(&a.count));
    topics
}

/// Scans whitespace-separated tokens for CVE-style identifiers.
///
/// A token counts when, upper-cased, it starts with `CVE-` and is at least 9
/// bytes long. Identifiers glued to punctuation or other words are missed.
pub fn extract_cve_ids(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_uppercase)
        .filter(|token| token.starts_with(CVE_PREFIX) && token.len() >= CVE_MIN_LEN)
        .collect()
}

/// CVE identifiers mentioned in an entry's title or description.
pub fn entry_cve_ids(entry: &Entry) -> Vec<String> {
    extract_cve_ids(&format!("{} {}", entry.title, entry.description))
}

/// Distinct identifiers from this week's entries, sorted.
pub fn recent_cve_ids(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.is_this_week)
        .flat_map(entry_cve_ids)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SourceRecord, DEFAULT_COLOR, UNCATEGORIZED};
    use pretty_assertions::assert_eq;

    fn entry(id: &str, source: &str) -> Entry {
        Entry {
            id: id.to_string(),
            title: String::new(),
            link: None,
            description: String::new(),
            author: String::new(),
            published_raw: String::new(),
            published_at: None,
            tags: Vec::new(),
            source_urls: vec![format!("https://x/{source}")],
            source_names: vec![source.to_string()],
            effective_priority: 1,
            is_new: false,
            is_today: false,
            is_this_week: false,
        }
    }

    fn index() -> CategoryIndex {
        CategoryIndex::new(&[
            SourceRecord::new("https://medium.com/feed/tag/osint", "Tools & OSINT", 7, "#74B9FF"),
            SourceRecord::new("https://medium.com/feed/tag/malware", "Malware & Threats", 9, "#FD79A8"),
        ])
    }

    #[test]
    fn test_category_stats_counts_and_order() {
        let mut a = entry("a", "Malware");
        a.is_new = true;
        let mut b = entry("b", "OSINT");
        b.is_new = true;
        b.is_today = true;
        let c = entry("c", "OSINT");
        let d = entry("d", "Renamed");

        let stats = category_stats(&[a, b, c, d], &index());
        assert_eq!(
            stats,
            vec![
                CategoryStats {
                    name: "Tools & OSINT".into(),
                    total_posts: 2,
                    new_posts: 1,
                    today_posts: 1,
                    color: "#74B9FF".into(),
                },
                CategoryStats {
                    name: "Malware & Threats".into(),
                    total_posts: 1,
                    new_posts: 1,
                    today_posts: 0,
                    color: "#FD79A8".into(),
                },
                CategoryStats {
                    name: UNCATEGORIZED.into(),
                    total_posts: 1,
                    new_posts: 0,
                    today_posts: 0,
                    color: DEFAULT_COLOR.into(),
                },
            ]
        );
    }

    #[test]
    fn test_category_uses_first_known_source_name() {
        let mut e = entry("a", "Renamed");
        e.source_names.push("Malware".to_string());
        e.source_names.push("OSINT".to_string());

        let stats = category_stats(&[e], &index());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "Malware & Threats");
    }

    #[test]
    fn test_trending_topics_lowercased_and_counted() {
        let mut a = entry("a", "OSINT");
        a.tags = vec!["Bug Bounty".into(), "XSS".into()];
        let mut b = entry("b", "OSINT");
        b.tags = vec!["bug bounty".into(), "recon".into(), "  ".into()];
        let mut c = entry("c", "OSINT");
        c.tags = vec!["xss".into(), "BUG BOUNTY".into()];

        let topics = trending_topics(&[a, b, c]);
        assert_eq!(
            topics,
            vec![
                TrendingTopic { name: "bug bounty".into(), count: 3 },
                TrendingTopic { name: "xss".into(), count: 2 },
                TrendingTopic { name: "recon".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_extract_cve_ids_whitespace_tokens_only() {
        let text = "Patch cve-2024-3094 now! Also CVE-2023-4863\tand (CVE-2021-44228) plus CVE-1 and CVE-2022-0001";
        assert_eq!(
            extract_cve_ids(text),
            vec!["CVE-2024-3094", "CVE-2023-4863", "CVE-2022-0001"]
        );
        assert!(extract_cve_ids("").is_empty());
    }

    #[test]
    fn test_extract_cve_ids_keeps_repeats() {
        assert_eq!(
            extract_cve_ids("CVE-2024-1111 CVE-2024-1111"),
            vec!["CVE-2024-1111", "CVE-2024-1111"]
        );
    }

    #[test]
    fn test_recent_cve_ids_only_this_week_sorted_distinct() {
        let mut recent = entry("a", "OSINT");
        recent.is_this_week = true;
        recent.title = "CVE-2024-2222 exploited".into();
        recent.description = "see CVE-2024-1111 and CVE-2024-2222".into();
        let mut old = entry("b", "OSINT");
        old.title = "CVE-2019-0001 retrospective".into();

        assert_eq!(
            recent_cve_ids(&[recent.clone(), old]),
            vec!["CVE-2024-1111", "CVE-2024-2222"]
        );
        assert_eq!(
            entry_cve_ids(&recent),
            vec!["CVE-2024-2222", "CVE-2024-1111", "CVE-2024-2222"]
        );
    }
}
