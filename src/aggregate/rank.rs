use std::cmp::Ordering;

use super::entry::{Entry, EntrySet};

/// Orders entries for presentation.
///
/// Keys, each only breaking ties of the previous one:
/// 1. effective priority, ascending
/// 2. new before seen
/// 3. today before older
/// 4. newest first, unparsable dates last
///
/// The sort is stable, so full ties keep first-sighting order.
pub fn rank(entries: EntrySet) -> Vec<Entry> {
    let mut ranked = entries.into_entries();
    ranked.sort_by(compare);
    ranked
}

fn compare(a: &Entry, b: &Entry) -> Ordering {
    a.effective_priority
        .cmp(&b.effective_priority)
        .then_with(|| b.is_new.cmp(&a.is_new))
        .then_with(|| b.is_today.cmp(&a.is_today))
        // None < Some, so reversing puts unset timestamps at the end
        .then_with(|| b.published_at.cmp(&a.published_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RunContext;
    use crate::catalog::SourceRecord;
    use crate::feed::RawItem;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn source(name: &str, priority: u32) -> SourceRecord {
        SourceRecord::new(&format!("https://feeds.example.com/{name}"), "Cat", priority, "#000")
    }

    fn item(id: &str, published_raw: &str) -> RawItem {
        RawItem {
            id: id.to_string(),
            title: id.to_uppercase(),
            published_raw: published_raw.to_string(),
            ..RawItem::default()
        }
    }

    fn ctx(ledger: &str) -> RunContext {
        RunContext::new(ledger, Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap())
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_priority_dominates() {
        let mut set = EntrySet::new();
        let ctx = ctx("seen-low");
        set.merge(vec![item("seen-low", "")], &source("low", 9), &ctx);
        set.merge(vec![item("fresh-high", "")], &source("high", 1), &ctx);

        assert_eq!(ids(&rank(set)), vec!["fresh-high", "seen-low"]);
    }

    #[test]
    fn test_new_then_today_then_recency() {
        let mut set = EntrySet::new();
        let ctx = ctx("old-today");
        set.merge(
            vec![
                item("old-today", "Wed, 08 Jan 2025 11:00:00 GMT"),
                item("new-older", "Mon, 06 Jan 2025 11:00:00 GMT"),
                item("new-today-early", "Wed, 08 Jan 2025 01:00:00 GMT"),
                item("new-today-late", "Wed, 08 Jan 2025 10:00:00 GMT"),
                item("new-undated", "garbage"),
                item("new-oldest", "Sun, 05 Jan 2025 11:00:00 GMT"),
            ],
            &source("s", 3),
            &ctx,
        );

        assert_eq!(
            ids(&rank(set)),
            vec![
                "new-today-late",
                "new-today-early",
                "new-older",
                "new-oldest",
                "new-undated",
                "old-today",
            ]
        );
    }

    #[test]
    fn test_full_ties_keep_first_sighting_order() {
        let mut set = EntrySet::new();
        let ctx = ctx("");
        let same = "Tue, 07 Jan 2025 08:00:00 GMT";
        set.merge(vec![item("c", same), item("a", same)], &source("one", 2), &ctx);
        set.merge(vec![item("b", same), item("d", "nope"), item("e", "nope")], &source("two", 2), &ctx);

        assert_eq!(ids(&rank(set)), vec!["c", "a", "b", "d", "e"]);
    }

    #[test]
    fn test_unset_date_sorts_after_all_dated() {
        let mut set = EntrySet::new();
        let ctx = ctx("");
        set.merge(
            vec![item("undated", "not-a-date"), item("ancient", "Mon, 01 Jan 1990 00:00:00 GMT")],
            &source("s", 1),
            &ctx,
        );

        assert_eq!(ids(&rank(set)), vec!["ancient", "undated"]);
    }
}
