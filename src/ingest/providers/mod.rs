// src/ingest/providers/mod.rs
pub mod feed_xml;
pub mod forum_json;
pub mod microblog_rss;
pub mod news_rss;

use std::time::Duration;

/// Politeness gap between consecutive upstream requests.
pub(crate) async fn pause(gap: Duration, first: bool) {
    if !first && !gap.is_zero() {
        tokio::time::sleep(gap).await;
    }
}
