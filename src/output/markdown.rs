//! The Markdown digest. It doubles as the next run's "seen before" ledger,
//! so every entry id must appear verbatim in the rendered text. Ids are
//! listed in a collapsed code block after the posts table, where no
//! character can break the surrounding Markdown.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::{format_duration, ReportData, APP_NAME, APP_VERSION};
use crate::aggregate::Entry;
use crate::util::{collapse_whitespace, strip_control_chars, truncate_to_width};

/// Maximum rendered title width in columns, ellipsis included.
pub const MAX_TITLE_WIDTH: usize = 85;

const TOP_TRENDING: usize = 10;
const MARKDOWN_SPECIAL: [char; 7] = ['|', '[', ']', '*', '_', '`', '#'];

/// Renders the full report.
pub fn render(data: &ReportData<'_>) -> Result<String, std::fmt::Error> {
    let mut out = String::with_capacity(256 + data.entries.len() * 160);
    let stats = data.stats;

    writeln!(out, "# 🛡️ {APP_NAME}\n")?;
    writeln!(
        out,
        "[![Status](https://img.shields.io/badge/Status-🟢_Active-success?style=for-the-badge)](#) \
         [![Posts](https://img.shields.io/badge/Posts-{}-blue?style=for-the-badge)](#) \
         [![New](https://img.shields.io/badge/New-{}-orange?style=for-the-badge)](#) \
         [![Today](https://img.shields.io/badge/Today-{}-red?style=for-the-badge)](#)\n",
        stats.total_entries, stats.new_entries, stats.today_entries
    )?;

    writeln!(out, "## 📊 Quick Stats\n")?;
    writeln!(out, "| Metric | Count | Percentage |")?;
    writeln!(out, "|--------|-------|------------|")?;
    writeln!(out, "| 📰 **Total Posts** | **{}** | 100% |", stats.total_entries)?;
    writeln!(
        out,
        "| 🆕 **New Posts** | **{}** | {:.1}% |",
        stats.new_entries,
        stats.entry_share(stats.new_entries)
    )?;
    writeln!(
        out,
        "| 📅 **Today's Posts** | **{}** | {:.1}% |",
        stats.today_entries,
        stats.entry_share(stats.today_entries)
    )?;
    writeln!(
        out,
        "| 📈 **This Week** | **{}** | {:.1}% |",
        stats.week_entries,
        stats.entry_share(stats.week_entries)
    )?;
    writeln!(
        out,
        "| 🔄 **Success Rate** | **{}/{}** | {:.1}% |\n",
        stats.successful_feeds,
        stats.total_feeds,
        stats.success_rate()
    )?;

    writeln!(out, "## 🏷️ Categories Overview\n")?;
    writeln!(out, "| Category | Posts | New | Today | Trend |")?;
    writeln!(out, "|----------|--------|-----|-------|-------|")?;
    for cat in &data.categories {
        writeln!(
            out,
            "| **{}** | {} | {} | {} | {} |",
            cat.name,
            cat.total_posts,
            cat.new_posts,
            cat.today_posts,
            trend_glyph(cat.new_posts)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## ℹ️ Update Information\n")?;
    writeln!(out, "- **Last Updated**: {} GMT", super::format_date(data.now))?;
    writeln!(out, "- **Processing Time**: {}", format_duration(stats.processing_time))?;
    writeln!(
        out,
        "- **Feeds Processed**: {}/{} ({:.1}% success rate)",
        stats.successful_feeds,
        stats.total_feeds,
        stats.success_rate()
    )?;
    writeln!(out, "- **Rate Limited**: {} feeds\n", stats.rate_limited)?;

    writeln!(out, "## 📰 Latest Cybersecurity Posts\n")?;
    writeln!(out, "> 🔍 **Pro Tip**: Use `Ctrl+F` to search for specific topics, CVEs, or tools!\n")?;
    writeln!(out, "| 🕒 Time | 📄 Title | 📂 Category | 🆕 | 📅 | 📊 |")?;
    writeln!(out, "|---------|----------|-------------|----|----|----|")?;
    for entry in data.entries {
        write_post_row(&mut out, entry, data)?;
    }
    writeln!(out)?;
    write_id_index(&mut out, data.entries)?;

    writeln!(out, "\n---\n")?;
    writeln!(out, "## 🛠️ Technical Details\n")?;
    writeln!(out, "- **Generator**: {APP_NAME} v{APP_VERSION}")?;
    writeln!(
        out,
        "- **Sources**: {} RSS feeds across {} categories\n",
        data.source_count,
        data.categories.len()
    )?;

    writeln!(out, "## 📈 Trending Topics\n")?;
    for topic in data.trending.iter().take(TOP_TRENDING) {
        writeln!(out, "- **{}** ({} posts)", topic.name, topic.count)?;
    }

    Ok(out)
}

fn write_post_row(out: &mut String, entry: &Entry, data: &ReportData<'_>) -> std::fmt::Result {
    let title = sanitize_title(&entry.title);
    let category = data.index.category_of(&entry.source_names);
    let new_badge = if entry.is_new { "🆕" } else { "" };
    let today_badge = if entry.is_today { "📅" } else { "" };
    let time = format_display_time(entry.published_at, data.now);

    let target = if is_web_url(&entry.id) {
        entry.id.as_str()
    } else {
        entry.link.as_deref().unwrap_or(&entry.id)
    };

    writeln!(
        out,
        "| {time} | [{title}]({}) | {category} | {new_badge} | {today_badge} | {} |",
        link_target(target),
        priority_badge(entry.effective_priority)
    )
}

/// Every entry id, one per line, inside a fence longer than any backtick
/// run the ids contain.
fn write_id_index(out: &mut String, entries: &[Entry]) -> std::fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }

    let longest_run = entries
        .iter()
        .map(|e| longest_backtick_run(&e.id))
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);

    writeln!(out, "<details>")?;
    writeln!(out, "<summary>Post ids</summary>\n")?;
    writeln!(out, "{fence}text")?;
    for entry in entries {
        writeln!(out, "{}", entry.id)?;
    }
    writeln!(out, "{fence}\n")?;
    writeln!(out, "</details>")
}

fn longest_backtick_run(s: &str) -> usize {
    s.split(|c: char| c != '`').map(str::len).max().unwrap_or(0)
}

/// Percent-encodes the characters that would end a link destination or a
/// table cell.
fn link_target(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            '<' => encoded.push_str("%3C"),
            '>' => encoded.push_str("%3E"),
            '|' => encoded.push_str("%7C"),
            '\n' => encoded.push_str("%0A"),
            '\r' => encoded.push_str("%0D"),
            c => encoded.push(c),
        }
    }
    encoded
}

fn is_web_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

/// Makes a feed title safe for a single Markdown table cell.
///
/// Control characters are dropped, line breaks become spaces, characters that
/// Markdown would interpret are backslash-escaped, and the result is cut to
/// [`MAX_TITLE_WIDTH`] columns.
pub fn sanitize_title(title: &str) -> String {
    let cleaned = strip_control_chars(title);

    let mut escaped = String::with_capacity(cleaned.len() + 8);
    for c in cleaned.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    let collapsed = collapse_whitespace(&escaped);
    truncate_to_width(&collapsed, MAX_TITLE_WIDTH).into_owned()
}

/// Human relative age of a publish time, measured from `now`.
pub fn format_display_time(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published) = published else {
        return "Unknown".to_string();
    };

    let age = now - published;
    if age.num_minutes() < 1 {
        "Just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else if age.num_days() < 7 {
        format!("{}d ago", age.num_days())
    } else {
        published.format("%d %b %H:%M").to_string()
    }
}

/// 🔥 for priorities 1-3, ⭐ for 4-6, 📝 for the rest.
pub fn priority_badge(priority: u32) -> &'static str {
    match priority {
        0..=3 => "🔥",
        4..=6 => "⭐",
        _ => "📝",
    }
}

fn trend_glyph(new_posts: usize) -> &'static str {
    match new_posts {
        0 => "📊",
        1..=5 => "📈",
        _ => "🚀",
    }
}
