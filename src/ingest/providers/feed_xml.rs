// src/ingest/providers/feed_xml.rs
//! RSS 2.0 / Atom parsing shared by the XML-speaking providers.

use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<Text>,
    #[serde(default)]
    link: Vec<AtomLink>,
    updated: Option<String>,
    published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Format-neutral view of one feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: u64,
    pub source: Option<String>,
}

/// Parse an RSS 2.0 or Atom document.
///
/// The root element is checked first so that an HTML error page served with a
/// 200 status is rejected instead of yielding an empty feed.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, String> {
    let xml = scrub_html_entities_for_xml(xml);
    match root_element(&xml).as_deref() {
        Some("rss") => parse_rss(&xml),
        Some("feed") => parse_atom(&xml),
        Some(other) => Err(format!("unexpected root element <{other}>")),
        None => Err("document has no root element".to_string()),
    }
}

fn parse_rss(xml: &str) -> Result<Vec<FeedEntry>, String> {
    let rss: Rss = from_str(xml).map_err(|e| format!("rss: {e}"))?;
    Ok(rss
        .channel
        .item
        .into_iter()
        .map(|it| FeedEntry {
            title: it.title.unwrap_or_default(),
            link: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
            published_at: it.pub_date.as_deref().map(parse_rfc2822_to_unix).unwrap_or(0),
            source: it
                .source
                .map(|s| s.value.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
        .collect())
}

fn parse_atom(xml: &str) -> Result<Vec<FeedEntry>, String> {
    let feed: AtomFeed = from_str(xml).map_err(|e| format!("atom: {e}"))?;
    Ok(feed
        .entry
        .into_iter()
        .map(|e| {
            // rel="alternate" is the default when rel is absent
            let link = e
                .link
                .iter()
                .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
                .or_else(|| e.link.first())
                .and_then(|l| l.href.clone())
                .unwrap_or_default();
            let ts = e.published.as_deref().or(e.updated.as_deref());
            FeedEntry {
                title: e.title.map(|t| t.value).unwrap_or_default(),
                link,
                published_at: ts.map(parse_rfc3339_to_unix).unwrap_or(0),
                source: None,
            }
        })
        .collect())
}

fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        // obsolete zone names such as "GMT"
        .or_else(|| {
            chrono::DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.timestamp())
        })
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

fn parse_rfc3339_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .map(|dt| dt.unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

// quick-xml only knows the five XML entities; feeds routinely leak HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
