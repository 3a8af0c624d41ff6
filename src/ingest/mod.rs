// src/ingest/mod.rs
pub mod failover;
pub mod http;
pub mod providers;
pub mod scheduler;
pub mod types;

use std::collections::HashSet;

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::ingest::types::{FeedItem, SourceProvider};
use crate::seen::SeenStore;

/// Decode entities, strip tags, collapse whitespace and cap to `max_chars`.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("static regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace (incl. NBSP)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("static regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 4) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }

    out
}

/// Short stable id: first 6 bytes of SHA-256, hex encoded.
pub fn short_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Drop repeats of the same `seen_key` inside one batch, keeping the first.
pub fn dedup_batch(items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut keys = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|it| keys.insert(it.seen_key()))
        .collect()
}

/// Return the items whose key is not yet in `seen`, in input order, and mark
/// them seen. A key repeated inside `items` is returned once.
pub fn filter_new(seen: &mut SeenStore, items: Vec<FeedItem>) -> Vec<FeedItem> {
    let total = items.len();
    let fresh: Vec<FeedItem> = items
        .into_iter()
        .filter(|it| seen.insert(it.seen_key()))
        .collect();

    counter!("feed_items_new_total").increment(fresh.len() as u64);
    tracing::debug!(total, new = fresh.len(), "dedup against seen store");
    fresh
}

/// Fetch from every provider in order. A provider error is logged and counts
/// as "no items" for that provider; it never stops the others.
pub async fn fetch_all(providers: &[Box<dyn SourceProvider>]) -> Vec<FeedItem> {
    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(provider = p.name(), items = v.len(), "provider fetched");
                counter!("feed_items_fetched_total", "provider" => p.name()).increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = %e, provider = p.name(), "provider error");
                counter!("feed_provider_errors_total", "provider" => p.name()).increment(1);
            }
        }
    }
    raw
}
