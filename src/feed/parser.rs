use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// The feed body could not be decoded. No items are returned in that case.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Neither the RSS 2.0 decoder nor the Atom/RDF fallback accepted the document
    #[error("Invalid feed XML: {rss} (fallback: {fallback})")]
    Malformed { rss: String, fallback: String },
}

/// One item as it appears in a single feed. No dates are interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    /// Identity used for deduplication across feeds. Not necessarily a URL.
    pub id: String,
    pub link: Option<String>,
    /// Publish timestamp exactly as the feed wrote it.
    pub published_raw: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
}

/// Channel metadata plus items in document order.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Channel {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "item")]
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    title: Option<String>,
    guid: Option<Guid>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    author: Option<String>,
    // Medium and most WordPress feeds put the author here instead of <author>
    #[serde(rename = "dc:creator", alias = "creator")]
    creator: Option<String>,
    #[serde(rename = "category")]
    categories: Vec<String>,
}

/// `<guid isPermaLink="...">` carries an attribute, so its text is read explicitly.
#[derive(Debug, Default, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Decodes a feed document.
///
/// RSS 2.0 is read directly so that `pubDate` survives as raw text. Anything
/// else (Atom, RSS 1.0) goes through `feed-rs`, whose already-parsed
/// timestamps are rendered back to RFC 3339.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, ParseError> {
    match quick_xml::de::from_reader::<_, Rss>(bytes) {
        // RSS 1.0 also has a <channel>, but its items sit beside it
        Ok(rss) if rss.channel.items.is_empty() => match feed_rs::parser::parse(bytes) {
            Ok(feed) if !feed.entries.is_empty() => Ok(from_feed_rs(feed)),
            _ => Ok(from_rss(rss)),
        },
        Ok(rss) => Ok(from_rss(rss)),
        Err(rss_err) => match feed_rs::parser::parse(bytes) {
            Ok(feed) => {
                tracing::debug!(error = %rss_err, "Not RSS 2.0, decoded with feed-rs");
                Ok(from_feed_rs(feed))
            }
            Err(fallback_err) => Err(ParseError::Malformed {
                rss: rss_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        },
    }
}

fn from_rss(rss: Rss) -> ParsedFeed {
    let items = rss
        .channel
        .items
        .into_iter()
        .map(|item| {
            let title = item.title.unwrap_or_default();
            let published_raw = item.pub_date.map(|d| d.trim().to_string()).unwrap_or_default();
            let link = item.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
            let guid = item.guid.map(|g| g.value);
            let id = item_identity(guid.as_deref(), link.as_deref(), &title, &published_raw);

            RawItem {
                title,
                id,
                link,
                published_raw,
                description: item.description.unwrap_or_default(),
                author: item.author.or(item.creator).unwrap_or_default(),
                tags: item.categories.into_iter().map(|c| c.trim().to_string()).collect(),
            }
        })
        .collect();

    ParsedFeed {
        title: rss.channel.title,
        description: rss.channel.description,
        items,
    }
}

fn from_feed_rs(feed: feed_rs::model::Feed) -> ParsedFeed {
    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.clone());
            let published_raw = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            let author = entry
                .authors
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let id = item_identity(Some(&entry.id), link.as_deref(), &title, &published_raw);

            RawItem {
                title,
                id,
                link,
                published_raw,
                description,
                author,
                tags: entry.categories.into_iter().map(|c| c.term).collect(),
            }
        })
        .collect();

    ParsedFeed {
        title: feed.title.map(|t| t.content),
        description: feed.description.map(|d| d.content),
        items,
    }
}

/// The guid when present, then the link, then a content hash so that
/// identifier-less items never collapse into a single entry.
fn item_identity(guid: Option<&str>, link: Option<&str>, title: &str, published: &str) -> String {
    if let Some(id) = guid.map(str::trim).filter(|g| !g.is_empty()) {
        return id.to_string();
    }
    if let Some(link) = link.filter(|l| !l.is_empty()) {
        return link.to_string();
    }

    let input = format!("{title}|{published}");
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
